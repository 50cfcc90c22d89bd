use crate::models::Candle;
use crate::strategy::Strategy;

/// Reference strategy: buy on a rising candle, close otherwise.
#[derive(Debug, Default)]
pub struct CloseAboveOpen;

impl Strategy for CloseAboveOpen {
    fn evaluate(&self, candle: &Candle) -> bool {
        candle.close > candle.open
    }

    fn name(&self) -> &str {
        "close-above-open"
    }
}
