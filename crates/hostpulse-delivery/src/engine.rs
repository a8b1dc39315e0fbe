use crate::backoff::Backoff;
use crate::error::{DeliveryError, Result};
use crate::transport::MetricSink;
use hostpulse_common::types::MetricRecord;
use std::time::Duration;
use tokio::time::sleep;

/// Total HTTP delivery attempts per cycle.
pub const MAX_HTTP_ATTEMPTS: u32 = 3;

/// Delivers metric batches with transport fallback and retry.
///
/// The engine owns the transports and the shared [`Backoff`] counter.
/// Per cycle: one bus publish attempt when a bus sink is configured, then
/// up to [`MAX_HTTP_ATTEMPTS`] HTTP attempts with a backoff sleep between
/// attempts (not after the last). Any success resets the counter; total
/// failure leaves it elevated for the next cycle and drops the batch —
/// delivery is at-most-once per cycle, best-effort.
pub struct DeliveryEngine {
    bus: Option<Box<dyn MetricSink>>,
    http: Box<dyn MetricSink>,
    backoff: Backoff,
}

impl DeliveryEngine {
    pub fn new(bus: Option<Box<dyn MetricSink>>, http: Box<dyn MetricSink>) -> Self {
        Self {
            bus,
            http,
            backoff: Backoff::new(),
        }
    }

    /// Raw backoff counter, exposed for logging and tests.
    pub fn backoff_secs(&self) -> u64 {
        self.backoff.current_secs()
    }

    /// Attempts to deliver one batch, returning the final error when every
    /// transport attempt failed.
    pub async fn deliver(&mut self, batch: &[MetricRecord]) -> Result<()> {
        if let Some(bus) = self.bus.as_mut() {
            match bus.send(batch).await {
                Ok(()) => {
                    self.backoff.reset();
                    tracing::debug!(records = batch.len(), transport = bus.name(), "batch delivered");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        transport = bus.name(),
                        error = %e,
                        "bus publish failed, falling back to HTTP"
                    );
                }
            }
        }

        let mut last_err: Option<DeliveryError> = None;
        for attempt in 1..=MAX_HTTP_ATTEMPTS {
            match self.http.send(batch).await {
                Ok(()) => {
                    self.backoff.reset();
                    tracing::debug!(records = batch.len(), transport = self.http.name(), attempt, "batch delivered");
                    return Ok(());
                }
                Err(e) => {
                    if attempt < MAX_HTTP_ATTEMPTS {
                        let wait_secs = self.backoff.wait_secs();
                        tracing::warn!(
                            attempt,
                            max_attempts = MAX_HTTP_ATTEMPTS,
                            wait_secs,
                            error = %e,
                            "metric delivery failed, retrying"
                        );
                        last_err = Some(e);
                        sleep(Duration::from_secs(wait_secs)).await;
                        self.backoff.escalate();
                    } else {
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| DeliveryError::Bus("no delivery attempt was made".to_string())))
    }
}
