//! Startup reconciliation against the broker's position record.

use crate::domain::position::PositionState;
use crate::ports::broker_port::OrderGateway;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// Broker holds a position; local state now mirrors its entry price.
    Adopted { qty: f64, avg_entry_price: f64 },
    /// Broker holds nothing; local state forced FLAT.
    Flattened,
    /// Position query failed; persisted state kept.
    Unavailable { reason: String },
}

/// Make the broker's position authoritative over `position`.
///
/// A broker position overwrites both the purchase price and the tracked peak
/// with the average entry price. An absent one forces FLAT whatever was
/// persisted.
pub fn reconcile(
    position: &mut PositionState,
    gateway: &dyn OrderGateway,
    symbol: &str,
) -> ReconcileOutcome {
    match gateway.position(symbol) {
        Ok(Some(p)) => {
            position.adopt_broker_entry(p.avg_entry_price);
            tracing::info!(
                symbol,
                qty = p.qty,
                avg_entry_price = p.avg_entry_price,
                "adopted broker position"
            );
            ReconcileOutcome::Adopted {
                qty: p.qty,
                avg_entry_price: p.avg_entry_price,
            }
        }
        Ok(None) => {
            if position.is_long() {
                tracing::warn!(symbol, "persisted LONG but broker holds nothing, resetting");
            }
            position.reset_flat();
            ReconcileOutcome::Flattened
        }
        Err(e) => {
            tracing::warn!(error = %e, "reconciliation skipped, keeping persisted state");
            ReconcileOutcome::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}
