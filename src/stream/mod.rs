use std::collections::VecDeque;

use chrono::NaiveDateTime;
use tokio::time::{sleep, Duration};

use crate::api::MarketData;
use crate::clock;
use crate::error::DataError;
use crate::models::Candle;

/// Lazy, infinite, non-restartable sequence of candles for a single
/// instrument, polling the upstream source once per period.
///
/// Candles are deduplicated by strictly increasing `end` timestamp: the
/// upstream re-sends the whole trading day on every poll, and only
/// candles newer than the watermark are emitted. A candle older than the
/// watermark but never seen before is dropped the same way.
pub struct CandleStream<D> {
    source: D,
    instrument: String,
    period_minutes: u32,
    last_seen_end: NaiveDateTime,
    buffer: VecDeque<Candle>,
    polled: bool,
}

impl<D: MarketData> CandleStream<D> {
    pub fn new(source: D, instrument: impl Into<String>, period_minutes: u32) -> Self {
        Self {
            source,
            instrument: instrument.into(),
            period_minutes,
            last_seen_end: NaiveDateTime::MIN,
            buffer: VecDeque::new(),
            polled: false,
        }
    }

    /// Next fresh candle, in emission order. Suspends for the polling
    /// period between upstream batches; a source error is terminal.
    pub async fn next_candle(&mut self) -> Result<Candle, DataError> {
        loop {
            if let Some(candle) = self.buffer.pop_front() {
                return Ok(candle);
            }

            if self.polled {
                sleep(Duration::from_secs(u64::from(self.period_minutes) * 60)).await;
            }
            self.poll().await?;
        }
    }

    async fn poll(&mut self) -> Result<(), DataError> {
        let batch = self
            .source
            .candles(&self.instrument, clock::today_msk(), self.period_minutes)
            .await?;
        self.polled = true;

        for candle in batch {
            if candle.end > self.last_seen_end {
                self.last_seen_end = candle.end;
                self.buffer.push_back(candle);
            } else {
                tracing::debug!(
                    instrument = %self.instrument,
                    end = %candle.end,
                    "Duplicate candle, skipping"
                );
            }
        }

        Ok(())
    }
}
