// Market data sources
pub mod moex;

pub use moex::MoexIssClient;

use crate::error::DataError;
use crate::models::Candle;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Capability the candle stream polls: one day of candles for one
/// instrument at a given interval. Any source with this shape works —
/// the exchange API in production, a scripted fixture in tests.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn candles(
        &self,
        instrument: &str,
        date: NaiveDate,
        period_minutes: u32,
    ) -> Result<Vec<Candle>, DataError>;
}
