use thiserror::Error;
use uuid::Uuid;

/// Market data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Parse(String),
}

/// Broker connector refusals and faults.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("insufficient funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("order rejected: {0}")]
    Rejected(String),
}

/// Terminal conditions of the execution loop.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("market data stream faulted: {0}")]
    DataSource(#[from] DataError),

    #[error("balance exhausted: {balance:.2} with no open orders left to close")]
    BalanceExhausted { balance: f64 },
}
