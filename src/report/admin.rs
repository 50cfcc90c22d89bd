use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::{Candle, OrderMetadata};
use crate::report::EventSink;

/// Reports incomings and order transitions to the admin record-keeping
/// service. Every push is best-effort: failures are logged and dropped.
pub struct AdminApiSink {
    client: Client,
    base_url: String,
    strategy_id: Option<Uuid>,
}

#[derive(Serialize)]
struct NewStrategy<'a> {
    name: &'a str,
    description: &'a str,
    source_code: &'a str,
}

#[derive(Deserialize)]
struct CreatedStrategy {
    id: Uuid,
}

impl AdminApiSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            strategy_id: None,
        }
    }

    /// Register the running strategy with the admin service so pushed
    /// records carry its id. Until this succeeds, records are pushed
    /// with a null strategy id.
    pub async fn register_strategy(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<Uuid, reqwest::Error> {
        let created: CreatedStrategy = self
            .client
            .post(format!("{}/strategies", self.base_url))
            .json(&NewStrategy {
                name,
                description,
                source_code: "",
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.strategy_id = Some(created.id);
        Ok(created.id)
    }

    async fn push(&self, endpoint: &str, data: serde_json::Value) {
        let payload = json!({
            "strategy_id": self.strategy_id,
            "data": data,
        });

        let result = self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        if let Err(e) = result {
            tracing::warn!("Failed to push {} record: {}", endpoint, e);
        }
    }
}

#[async_trait]
impl EventSink for AdminApiSink {
    async fn record_candle(&self, candle: &Candle) {
        match serde_json::to_value(candle) {
            Ok(data) => self.push("incomings", data).await,
            Err(e) => tracing::warn!("Failed to serialize candle: {}", e),
        }
    }

    async fn record_order(&self, order: &OrderMetadata) {
        match serde_json::to_value(order) {
            Ok(data) => self.push("orders", data).await,
            Err(e) => tracing::warn!("Failed to serialize order: {}", e),
        }
    }
}
