use crate::api::MarketData;
use crate::config::DEFAULT_ISS_BASE_URL;
use crate::error::DataError;
use crate::models::Candle;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::{sleep, Duration};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const ISS_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the MOEX ISS candles endpoint.
#[derive(Clone)]
pub struct MoexIssClient {
    client: Client,
    base_url: String,
}

/// ISS responds with a columnar table: a list of column names and
/// positional rows.
#[derive(Debug, Deserialize)]
struct IssCandlesResponse {
    candles: IssTable,
}

#[derive(Debug, Deserialize)]
struct IssTable {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl MoexIssClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch one day of candles, retrying transient failures with
    /// exponential backoff before giving up.
    async fn get_candles(
        &self,
        instrument: &str,
        date: NaiveDate,
        period_minutes: u32,
    ) -> Result<Vec<Candle>, DataError> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.fetch_once(instrument, date, period_minutes).await {
                Ok(candles) => {
                    if attempt > 1 {
                        tracing::info!(
                            "Fetched {} candles for {} after {} attempts",
                            candles.len(),
                            instrument,
                            attempt
                        );
                    }
                    return Ok(candles);
                }
                Err(e) => {
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
                        tracing::warn!(
                            "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                            attempt,
                            MAX_RETRIES,
                            instrument,
                            last_error.as_ref().unwrap(),
                            backoff_ms
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DataError::Parse("all retry attempts failed".to_string())))
    }

    async fn fetch_once(
        &self,
        instrument: &str,
        date: NaiveDate,
        period_minutes: u32,
    ) -> Result<Vec<Candle>, DataError> {
        let url = format!(
            "{}/iss/engines/stock/markets/shares/securities/{}/candles.json",
            self.base_url, instrument
        );
        let date = date.to_string();
        let interval = period_minutes.to_string();

        let response: IssCandlesResponse = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("from", date.as_str()),
                ("till", date.as_str()),
                ("interval", interval.as_str()),
                ("iss.meta", "off"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_table(response.candles)
    }
}

impl Default for MoexIssClient {
    fn default() -> Self {
        Self::new(DEFAULT_ISS_BASE_URL)
    }
}

#[async_trait]
impl MarketData for MoexIssClient {
    async fn candles(
        &self,
        instrument: &str,
        date: NaiveDate,
        period_minutes: u32,
    ) -> Result<Vec<Candle>, DataError> {
        self.get_candles(instrument, date, period_minutes).await
    }
}

fn parse_table(table: IssTable) -> Result<Vec<Candle>, DataError> {
    let col = |name: &str| {
        table
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataError::Parse(format!("missing column {:?}", name)))
    };

    let open = col("open")?;
    let close = col("close")?;
    let high = col("high")?;
    let low = col("low")?;
    let value = col("value")?;
    let volume = col("volume")?;
    let begin = col("begin")?;
    let end = col("end")?;

    table
        .data
        .into_iter()
        .map(|row| {
            Ok(Candle {
                open: number(&row, open)?,
                close: number(&row, close)?,
                high: number(&row, high)?,
                low: number(&row, low)?,
                value: number(&row, value)?,
                volume: number(&row, volume)?,
                begin: datetime(&row, begin)?,
                end: datetime(&row, end)?,
            })
        })
        .collect()
}

fn number(row: &[Value], index: usize) -> Result<f64, DataError> {
    row.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| DataError::Parse(format!("expected number at column {}", index)))
}

fn datetime(row: &[Value], index: usize) -> Result<NaiveDateTime, DataError> {
    let raw = row
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| DataError::Parse(format!("expected datetime at column {}", index)))?;

    NaiveDateTime::parse_from_str(raw, ISS_DATETIME_FORMAT)
        .map_err(|e| DataError::Parse(format!("bad datetime {:?}: {}", raw, e)))
}
