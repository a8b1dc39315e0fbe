use crate::error::{DeliveryError, Result};
use hostpulse_common::types::{Fingerprint, ServerOverride};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

/// Timeout for the one-shot registration request.
const REGISTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the per-cycle config pull.
const CONFIG_PULL_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin client for the discovery control plane: agent registration and the
/// per-cycle server config pull.
pub struct ControlPlaneClient {
    client: reqwest::Client,
    api_endpoint: String,
    token: Option<String>,
}

impl ControlPlaneClient {
    pub fn new(api_endpoint: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Registers this host's fingerprint with the backend.
    ///
    /// Called once at startup; the caller treats failure as non-fatal.
    pub async fn register(&self, tenant_id: &str, fingerprint: &Fingerprint) -> Result<()> {
        let payload = json!({
            "tenant_id": tenant_id,
            "fingerprint": {
                "hostname": fingerprint.hostname,
                "uuid": fingerprint.machine_uuid,
                "mac_address": fingerprint.primary_mac,
                "ip_address": fingerprint.primary_ip,
                "os": fingerprint.os,
                "os_version": fingerprint.os_version,
                "architecture": fingerprint.architecture,
            },
        });

        let mut request = self
            .client
            .post(format!("{}/v1/discovery/register", self.api_endpoint))
            .timeout(REGISTER_TIMEOUT)
            .json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => Err(DeliveryError::HttpStatus {
                status: status.as_u16(),
            }),
        }
    }

    /// Pulls the server-side config override for this host.
    ///
    /// Server configuration is advisory: any error (network, non-200,
    /// decode failure) yields `None` rather than propagating, so an
    /// unreachable control plane never blocks collection.
    pub async fn pull_config(&self, hostname: &str) -> Option<ServerOverride> {
        let mut request = self
            .client
            .get(format!("{}/v1/discovery/agents/config", self.api_endpoint))
            .query(&[("hostname", hostname)])
            .timeout(CONFIG_PULL_TIMEOUT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(error = %e, "config pull failed");
                return None;
            }
        };
        if response.status() != StatusCode::OK {
            return None;
        }
        match response.json::<ServerOverride>().await {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::debug!(error = %e, "config pull returned undecodable body");
                None
            }
        }
    }
}
