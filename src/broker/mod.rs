// Broker connectors
pub mod simulated;

pub use simulated::SimulatedBroker;

use crate::error::BrokerError;
use crate::models::{OrderKind, OrderMetadata};
use async_trait::async_trait;
use uuid::Uuid;

/// Capability set of a brokerage: open a position, close a position.
///
/// [`SimulatedBroker`] is the deterministic in-process implementation; a
/// real brokerage API client would conform to the same two operations.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    /// Open a position at `price` for `quantity` units.
    ///
    /// Refuses with [`BrokerError::InsufficientFunds`] when the account
    /// cannot cover `price * quantity`; no state changes on refusal.
    async fn make_order(
        &self,
        instrument: &str,
        price: f64,
        quantity: f64,
        kind: OrderKind,
    ) -> Result<OrderMetadata, BrokerError>;

    /// Close a tracked open order at `price` and realize its profit.
    ///
    /// Closing is one-shot: the returned metadata is a terminal snapshot
    /// and the order id stops being known to the connector.
    async fn close_order(&self, order_id: Uuid, price: f64) -> Result<OrderMetadata, BrokerError>;
}

#[async_trait]
impl<T: BrokerConnector + ?Sized> BrokerConnector for std::sync::Arc<T> {
    async fn make_order(
        &self,
        instrument: &str,
        price: f64,
        quantity: f64,
        kind: OrderKind,
    ) -> Result<OrderMetadata, BrokerError> {
        (**self).make_order(instrument, price, quantity, kind).await
    }

    async fn close_order(&self, order_id: Uuid, price: f64) -> Result<OrderMetadata, BrokerError> {
        (**self).close_order(order_id, price).await
    }
}
