use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One OHLCV observation for an instrument over a single interval,
/// as delivered by the exchange. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Money volume over the interval.
    pub value: f64,
    /// Lot volume over the interval.
    pub volume: f64,
    /// Interval start, exchange-local time.
    pub begin: NaiveDateTime,
    /// Interval end, exchange-local time. Ordering and dedup key.
    pub end: NaiveDateTime,
}

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Buy,
    Sell,
}

/// Order lifecycle state.
///
/// `Processing` and `Cancelled` are reserved for a future pending/cancel
/// path; nothing in the current flow produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Open,
    Cancelled,
    Close,
}

/// A simulated position held by the broker connector.
///
/// `close_price` and `close_dt` are `Some` exactly when `status` is
/// [`OrderStatus::Close`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMetadata {
    pub order_id: Uuid,
    pub instrument: String,
    pub kind: OrderKind,
    pub status: OrderStatus,

    pub open_price: f64,
    pub close_price: Option<f64>,
    pub quantity: f64,

    pub open_dt: DateTime<FixedOffset>,
    pub close_dt: Option<DateTime<FixedOffset>>,
}

impl OrderMetadata {
    /// Committed capital at open time.
    pub fn amount(&self) -> f64 {
        self.open_price * self.quantity
    }
}
