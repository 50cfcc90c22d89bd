// Trading strategy predicates
pub mod simple;

pub use simple::CloseAboveOpen;

use crate::models::Candle;

/// Decision predicate over one market data point: `true` means open a
/// position, `false` means close whatever is open.
///
/// Injected into the execution engine so real strategies can replace the
/// reference one without touching loop logic.
pub trait Strategy: Send + Sync {
    fn evaluate(&self, candle: &Candle) -> bool;

    /// Strategy name, used for logging and admin registration.
    fn name(&self) -> &str;
}
