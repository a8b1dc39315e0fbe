use crate::error::{DeliveryError, Result};
use async_trait::async_trait;
use hostpulse_common::types::MetricRecord;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;

/// Timeout for one metric ingest POST.
const METRIC_POST_TIMEOUT: Duration = Duration::from_secs(30);

/// A transport capable of delivering one batch of metric records.
///
/// The delivery engine is polymorphic over this trait: the bus and HTTP
/// transports implement it in production, and tests substitute scripted
/// sinks to drive the retry state machine.
#[async_trait]
pub trait MetricSink: Send {
    /// Transport name used in log lines (e.g., `"bus"`, `"http"`).
    fn name(&self) -> &str;

    /// Attempts a single delivery of the whole batch.
    async fn send(&mut self, batch: &[MetricRecord]) -> Result<()>;
}

/// Returns the bus subject a host publishes its metrics to.
pub fn metric_subject(tenant_id: &str, hostname: &str) -> String {
    format!("metrics.{tenant_id}.{hostname}")
}

/// Serializes a batch as newline-delimited JSON, one record per line.
pub fn to_ndjson(batch: &[MetricRecord]) -> Result<String> {
    let mut body = String::new();
    for record in batch {
        body.push_str(&serde_json::to_string(record)?);
        body.push('\n');
    }
    Ok(body)
}

/// Message-bus transport: one publish of the JSON-encoded batch to the
/// per-host subject.
pub struct BusTransport {
    client: async_nats::Client,
    subject: String,
}

impl BusTransport {
    pub fn new(client: async_nats::Client, subject: String) -> Self {
        Self { client, subject }
    }
}

#[async_trait]
impl MetricSink for BusTransport {
    fn name(&self) -> &str {
        "bus"
    }

    async fn send(&mut self, batch: &[MetricRecord]) -> Result<()> {
        let payload = serde_json::to_vec(batch)?;
        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| DeliveryError::Bus(e.to_string()))?;
        // publish only enqueues; flush forces the write so a dead server
        // surfaces as an error here instead of silently dropping the batch
        self.client
            .flush()
            .await
            .map_err(|e| DeliveryError::Bus(e.to_string()))?;
        Ok(())
    }
}

/// HTTP transport: NDJSON POST to the batched ingest endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(api_endpoint: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/v1/ingest/metrics/batch", api_endpoint.trim_end_matches('/')),
            token,
        }
    }
}

#[async_trait]
impl MetricSink for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&mut self, batch: &[MetricRecord]) -> Result<()> {
        let body = to_ndjson(batch)?;

        let mut request = self
            .client
            .post(&self.url)
            .timeout(METRIC_POST_TIMEOUT)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(DeliveryError::HttpStatus {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
