//! Entry rule, evaluated only while FLAT.
//!
//! Fires on an upward short/long crossover confirmed by RSI above 50.

use crate::domain::crossover::{self, Crossover};
use crate::domain::indicator::{IndicatorPair, Indicators};
use crate::domain::position::PositionState;

pub fn should_enter(
    position: &PositionState,
    previous: &IndicatorPair,
    current: &Indicators,
) -> bool {
    position.is_flat()
        && crossover::detect(previous, &current.pair) == Crossover::Up
        && current.is_bullish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(short: f64, long: f64, rsi: f64) -> Indicators {
        Indicators {
            pair: IndicatorPair::new(short, long),
            rsi,
        }
    }

    #[test]
    fn enters_on_cross_up_with_bullish_rsi() {
        let flat = PositionState::default();
        let prev = IndicatorPair::new(100.0, 100.0);
        assert!(should_enter(&flat, &prev, &indicators(101.0, 100.0, 60.0)));
    }

    #[test]
    fn no_entry_without_edge() {
        let flat = PositionState::default();
        let prev = IndicatorPair::new(101.0, 100.0);
        assert!(!should_enter(&flat, &prev, &indicators(102.0, 100.0, 60.0)));
    }

    #[test]
    fn no_entry_when_rsi_not_above_fifty() {
        let flat = PositionState::default();
        let prev = IndicatorPair::new(99.0, 100.0);
        assert!(!should_enter(&flat, &prev, &indicators(101.0, 100.0, 50.0)));
        assert!(!should_enter(&flat, &prev, &indicators(101.0, 100.0, 30.0)));
    }

    #[test]
    fn never_enters_while_long() {
        let mut long = PositionState::default();
        long.enter_long(100.0);
        let prev = IndicatorPair::new(99.0, 100.0);
        assert!(!should_enter(&long, &prev, &indicators(101.0, 100.0, 80.0)));
    }
}
