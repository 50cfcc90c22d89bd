use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::broker::BrokerConnector;
use crate::clock;
use crate::error::BrokerError;
use crate::models::{OrderKind, OrderMetadata, OrderStatus};

struct AccountState {
    balance: f64,
    orders: HashMap<Uuid, OrderMetadata>,
}

/// Simulated brokerage: a single account balance and the map of open
/// orders. The admission check and the debit happen under one lock, so
/// the balance can never be driven negative by concurrent opens.
pub struct SimulatedBroker {
    state: Mutex<AccountState>,
}

impl SimulatedBroker {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            state: Mutex::new(AccountState {
                balance: initial_balance,
                orders: HashMap::new(),
            }),
        }
    }

    /// Current account balance.
    pub fn balance(&self) -> f64 {
        self.state.lock().unwrap().balance
    }

    /// Number of orders currently held open.
    pub fn open_order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    /// Absolute cash returned by a close: the net gain or loss plus the
    /// originally committed capital. SELL is modeled short-style, so a
    /// falling price looks profitable.
    fn profit(order: &OrderMetadata, close_price: f64) -> f64 {
        let ratio = match order.kind {
            OrderKind::Buy => 1.0,
            OrderKind::Sell => -1.0,
        };
        ratio * (close_price - order.open_price) * order.quantity
            + order.open_price * order.quantity
    }
}

#[async_trait]
impl BrokerConnector for SimulatedBroker {
    async fn make_order(
        &self,
        instrument: &str,
        price: f64,
        quantity: f64,
        kind: OrderKind,
    ) -> Result<OrderMetadata, BrokerError> {
        if price < 0.0 || quantity < 0.0 {
            return Err(BrokerError::Rejected(format!(
                "negative price or quantity: {} x {}",
                price, quantity
            )));
        }

        let mut state = self.state.lock().unwrap();

        let amount = price * quantity;
        if amount > state.balance || state.balance <= 0.0 {
            return Err(BrokerError::InsufficientFunds {
                required: amount,
                available: state.balance,
            });
        }
        state.balance -= amount;

        let order = OrderMetadata {
            order_id: Uuid::new_v4(),
            instrument: instrument.to_string(),
            kind,
            status: OrderStatus::Open,
            open_price: price,
            close_price: None,
            quantity,
            open_dt: clock::now_msk(),
            close_dt: None,
        };
        state.orders.insert(order.order_id, order.clone());

        Ok(order)
    }

    async fn close_order(&self, order_id: Uuid, price: f64) -> Result<OrderMetadata, BrokerError> {
        let mut state = self.state.lock().unwrap();

        let mut order = state
            .orders
            .remove(&order_id)
            .ok_or(BrokerError::OrderNotFound(order_id))?;

        order.status = OrderStatus::Close;
        order.close_price = Some(price);
        order.close_dt = Some(clock::now_msk());

        state.balance += Self::profit(&order, price);

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_debits_balance() {
        let broker = SimulatedBroker::new(50_000.0);

        let order = broker
            .make_order("SBER", 100.0, 3.0, OrderKind::Buy)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.open_price, 100.0);
        assert!(order.close_price.is_none());
        assert!(order.close_dt.is_none());
        assert_eq!(broker.balance(), 49_700.0);
        assert_eq!(broker.open_order_count(), 1);
    }

    #[tokio::test]
    async fn test_refused_open_leaves_balance_unchanged() {
        let broker = SimulatedBroker::new(200.0);

        let result = broker.make_order("SBER", 100.0, 3.0, OrderKind::Buy).await;

        assert!(matches!(
            result,
            Err(BrokerError::InsufficientFunds {
                required,
                available,
            }) if required == 300.0 && available == 200.0
        ));
        assert_eq!(broker.balance(), 200.0);
        assert_eq!(broker.open_order_count(), 0);
    }

    #[tokio::test]
    async fn test_open_admitted_at_exact_balance() {
        let broker = SimulatedBroker::new(300.0);

        broker
            .make_order("SBER", 100.0, 3.0, OrderKind::Buy)
            .await
            .unwrap();

        assert_eq!(broker.balance(), 0.0);
    }

    #[tokio::test]
    async fn test_open_refused_on_non_positive_balance() {
        let broker = SimulatedBroker::new(0.0);

        // Even a free order is refused once the balance is gone
        let result = broker.make_order("SBER", 0.0, 0.0, OrderKind::Buy).await;
        assert!(matches!(
            result,
            Err(BrokerError::InsufficientFunds { .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_inputs_rejected() {
        let broker = SimulatedBroker::new(50_000.0);

        let result = broker.make_order("SBER", -1.0, 3.0, OrderKind::Buy).await;
        assert!(matches!(result, Err(BrokerError::Rejected(_))));
        assert_eq!(broker.balance(), 50_000.0);
    }

    #[tokio::test]
    async fn test_close_unknown_order_refused_without_mutation() {
        let broker = SimulatedBroker::new(50_000.0);

        let result = broker.close_order(Uuid::new_v4(), 100.0).await;

        assert!(matches!(result, Err(BrokerError::OrderNotFound(_))));
        assert_eq!(broker.balance(), 50_000.0);
    }

    #[tokio::test]
    async fn test_close_is_one_shot() {
        let broker = SimulatedBroker::new(50_000.0);
        let order = broker
            .make_order("SBER", 100.0, 3.0, OrderKind::Buy)
            .await
            .unwrap();

        let closed = broker.close_order(order.order_id, 110.0).await.unwrap();
        assert_eq!(closed.status, OrderStatus::Close);
        assert_eq!(closed.close_price, Some(110.0));
        assert!(closed.close_dt.is_some());

        // The id is forgotten after the first close
        let again = broker.close_order(order.order_id, 110.0).await;
        assert!(matches!(again, Err(BrokerError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_round_trip_at_same_price_restores_balance() {
        let broker = SimulatedBroker::new(50_000.0);
        let order = broker
            .make_order("SBER", 100.0, 3.0, OrderKind::Buy)
            .await
            .unwrap();

        broker.close_order(order.order_id, 100.0).await.unwrap();

        assert_eq!(broker.balance(), 50_000.0);
    }

    #[tokio::test]
    async fn test_buy_profit_formula() {
        let broker = SimulatedBroker::new(1_000.0);
        let order = broker
            .make_order("SBER", 100.0, 3.0, OrderKind::Buy)
            .await
            .unwrap();
        assert_eq!(broker.balance(), 700.0);

        // profit = (110 - 100) * 3 + 100 * 3 = 330
        broker.close_order(order.order_id, 110.0).await.unwrap();
        assert_eq!(broker.balance(), 1_030.0);
    }

    #[tokio::test]
    async fn test_sell_profit_formula_is_short_style() {
        let broker = SimulatedBroker::new(1_000.0);
        let order = broker
            .make_order("SBER", 100.0, 3.0, OrderKind::Sell)
            .await
            .unwrap();
        assert_eq!(broker.balance(), 700.0);

        // profit = -1 * (90 - 100) * 3 + 100 * 3 = 330: same +30 net gain
        broker.close_order(order.order_id, 90.0).await.unwrap();
        assert_eq!(broker.balance(), 1_030.0);
    }

    #[tokio::test]
    async fn test_balance_may_go_negative_through_closes() {
        let broker = SimulatedBroker::new(300.0);
        let order = broker
            .make_order("SBER", 100.0, 3.0, OrderKind::Sell)
            .await
            .unwrap();

        // Short position, price triples: profit = -(300-100)*3 + 300 = -300
        broker.close_order(order.order_id, 300.0).await.unwrap();

        assert_eq!(broker.balance(), -300.0);
    }

    #[tokio::test]
    async fn test_multiple_open_orders_within_balance() {
        let broker = SimulatedBroker::new(1_000.0);

        broker
            .make_order("SBER", 100.0, 4.0, OrderKind::Buy)
            .await
            .unwrap();
        broker
            .make_order("SBER", 100.0, 4.0, OrderKind::Buy)
            .await
            .unwrap();
        assert_eq!(broker.open_order_count(), 2);
        assert_eq!(broker.balance(), 200.0);

        // Third one no longer fits
        let result = broker.make_order("SBER", 100.0, 4.0, OrderKind::Buy).await;
        assert!(matches!(
            result,
            Err(BrokerError::InsufficientFunds { .. })
        ));
    }
}
