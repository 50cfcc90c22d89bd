use tokio::sync::watch;
use uuid::Uuid;

use crate::api::MarketData;
use crate::broker::BrokerConnector;
use crate::error::{BrokerError, EngineError};
use crate::models::{Candle, OrderKind};
use crate::report::EventSink;
use crate::strategy::Strategy;
use crate::stream::CandleStream;

/// The decision-and-execution loop: consumes the candle stream, asks the
/// strategy for a signal, and drives broker transitions.
///
/// `open_orders` is the loop's own view of what it opened. The broker's
/// map stays authoritative — a close refused as unknown is tolerated and
/// the id dropped, so the view converges instead of drifting.
pub struct ExecutionEngine<B> {
    instrument: String,
    quantity: f64,
    broker: B,
    strategy: Box<dyn Strategy>,
    sink: Box<dyn EventSink>,
    open_orders: Vec<Uuid>,
    last_close: Option<f64>,
}

impl<B: BrokerConnector> ExecutionEngine<B> {
    pub fn new(
        instrument: impl Into<String>,
        quantity: f64,
        broker: B,
        strategy: Box<dyn Strategy>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            quantity,
            broker,
            strategy,
            sink,
            open_orders: Vec::new(),
            last_close: None,
        }
    }

    /// Ids of orders opened by this loop and not yet seen closed.
    pub fn open_orders(&self) -> &[Uuid] {
        &self.open_orders
    }

    /// Run until the stream faults, the balance is beyond recovery, or
    /// the stop signal fires. On a stop signal any tracked orders are
    /// flushed (closed at the last seen price) before returning.
    pub async fn run<D: MarketData>(
        mut self,
        mut stream: CandleStream<D>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), EngineError> {
        loop {
            let candle = tokio::select! {
                _ = shutdown.changed() => break,
                result = stream.next_candle() => result?,
            };
            self.process_candle(&candle).await?;
        }

        tracing::info!("Stop signal received, flushing open orders");
        if let Some(price) = self.last_close {
            self.close_tracked(price).await;
        }
        Ok(())
    }

    /// Handle one candle: report it, evaluate the signal, act on it.
    pub async fn process_candle(&mut self, candle: &Candle) -> Result<(), EngineError> {
        tracing::info!(close = candle.close, end = %candle.end, "New candle");
        self.sink.record_candle(candle).await;
        self.last_close = Some(candle.close);

        let signal = self.strategy.evaluate(candle);
        tracing::info!(signal, strategy = self.strategy.name(), "Strategy signal");

        if signal {
            self.open_order(candle.close).await
        } else {
            self.close_tracked(candle.close).await;
            Ok(())
        }
    }

    async fn open_order(&mut self, price: f64) -> Result<(), EngineError> {
        match self
            .broker
            .make_order(&self.instrument, price, self.quantity, OrderKind::Buy)
            .await
        {
            Ok(order) => {
                tracing::info!(order_id = %order.order_id, price, "Opened order");
                self.open_orders.push(order.order_id);
                self.sink.record_order(&order).await;
                Ok(())
            }
            Err(BrokerError::InsufficientFunds {
                required,
                available,
            }) => {
                tracing::warn!(required, available, "Open refused, skipping signal");
                // Recoverable while an open order can still return funds
                if available <= 0.0 && self.open_orders.is_empty() {
                    return Err(EngineError::BalanceExhausted { balance: available });
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Open failed, skipping signal: {}", e);
                Ok(())
            }
        }
    }

    /// Attempt to close every tracked order at `price`. Unknown ids are
    /// dropped from the view; transient failures stay for the next tick.
    async fn close_tracked(&mut self, price: f64) {
        for order_id in std::mem::take(&mut self.open_orders) {
            match self.broker.close_order(order_id, price).await {
                Ok(order) => {
                    tracing::info!(
                        order_id = %order_id,
                        close_price = price,
                        "Closed order"
                    );
                    self.sink.record_order(&order).await;
                }
                Err(BrokerError::OrderNotFound(_)) => {
                    tracing::warn!(order_id = %order_id, "Order unknown to broker, dropping");
                }
                Err(e) => {
                    tracing::warn!(order_id = %order_id, "Close failed, will retry: {}", e);
                    self.open_orders.push(order_id);
                }
            }
        }
    }
}
