//! Edge-triggered crossover detection between two consecutive ticks.
//!
//! A crossover is a change in ordering from non-strict to strict: a tie on the
//! previous tick still counts as "not yet crossed".

use crate::domain::indicator::IndicatorPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    /// short crossed above long: `short > long` now, `short <= long` before.
    Up,
    /// short crossed below long: `short < long` now, `short >= long` before.
    Down,
    None,
}

pub fn detect(previous: &IndicatorPair, current: &IndicatorPair) -> Crossover {
    if current.short_above() && !previous.short_above() {
        Crossover::Up
    } else if current.short_below() && !previous.short_below() {
        Crossover::Down
    } else {
        Crossover::None
    }
}
