// Core modules
pub mod api;
pub mod broker;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod report;
pub mod strategy;
pub mod stream;

// Re-export commonly used types
pub use broker::{BrokerConnector, SimulatedBroker};
pub use engine::ExecutionEngine;
pub use models::*;
pub use strategy::Strategy;
pub use stream::CandleStream;
