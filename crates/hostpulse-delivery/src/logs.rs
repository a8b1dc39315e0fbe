use crate::error::{DeliveryError, Result};
use chrono::Utc;
use hostpulse_common::types::LogRecord;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

/// Timeout for one bulk log POST.
const LOG_POST_TIMEOUT: Duration = Duration::from_secs(10);

/// Ships agent log records to the bulk log-store endpoint.
///
/// One two-line NDJSON body (index action + document) per call, single
/// attempt; callers log and swallow failures.
pub struct LogShipper {
    client: reqwest::Client,
    bulk_url: String,
}

impl LogShipper {
    /// `skip_verify` disables TLS certificate validation. It is a separate,
    /// explicit opt-in and is NOT implied by enabling TLS.
    pub fn new(es_endpoint: &str, skip_verify: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_verify)
            .build()?;
        Ok(Self {
            client,
            bulk_url: format!("{}/_bulk", es_endpoint.trim_end_matches('/')),
        })
    }

    /// Daily index name for a tenant's agent logs.
    pub fn index_name(tenant_id: &str) -> String {
        format!("logs-{}-{}", tenant_id, Utc::now().format("%Y.%m.%d"))
    }

    pub async fn ship(&self, record: &LogRecord) -> Result<()> {
        let action = json!({ "index": { "_index": Self::index_name(&record.tenant_id) } });
        let body = format!(
            "{}\n{}\n",
            serde_json::to_string(&action)?,
            serde_json::to_string(record)?
        );

        let response = self
            .client
            .post(&self.bulk_url)
            .timeout(LOG_POST_TIMEOUT)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(DeliveryError::HttpStatus {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
