// Event reporting to the admin record-keeping service
pub mod admin;

pub use admin::AdminApiSink;

use crate::models::{Candle, OrderMetadata};
use async_trait::async_trait;

/// Sink for observability events: consumed candles and order
/// transitions. Fire-and-forget — implementations absorb and log their
/// own failures, nothing here may abort the trading path.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn record_candle(&self, candle: &Candle);

    async fn record_order(&self, order: &OrderMetadata);
}

/// Sink that drops everything, for running without the admin service.
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn record_candle(&self, _candle: &Candle) {}

    async fn record_order(&self, _order: &OrderMetadata) {}
}
