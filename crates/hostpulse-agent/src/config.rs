use hostpulse_common::types::ServerOverride;
use hostpulse_common::{DEFAULT_INTERVAL_SECS, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};

/// Agent run state, loaded from the environment at startup.
///
/// The collection interval is clamped to `[MIN_INTERVAL_SECS,
/// MAX_INTERVAL_SECS]` at load time; the last accepted server override is
/// stored on the config and may adjust the interval once per tick.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub tenant_id: String,
    pub api_endpoint: String,
    pub es_endpoint: String,
    pub bus_url: Option<String>,
    pub bus_user: Option<String>,
    pub bus_password: Option<String>,
    pub use_bus: bool,
    pub interval_secs: u64,
    pub agent_token: Option<String>,
    pub enable_tls: bool,
    /// Disables TLS certificate validation for the log store. Explicit and
    /// separate from `enable_tls`; defaults to off.
    pub tls_skip_verify: bool,
    pub server_override: Option<ServerOverride>,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            tenant_id: env_or("TENANT_ID", "default"),
            api_endpoint: env_or("API_ENDPOINT", "http://localhost:8000"),
            es_endpoint: env_or("ES_ENDPOINT", "http://localhost:9200"),
            bus_url: env_opt("BUS_URL"),
            bus_user: env_opt("BUS_USER"),
            bus_password: env_opt("BUS_PASSWORD"),
            use_bus: env_bool("USE_BUS"),
            interval_secs: clamp_interval(env_u64("COLLECTION_INTERVAL", DEFAULT_INTERVAL_SECS)),
            agent_token: env_opt("AGENT_TOKEN"),
            enable_tls: env_bool("ENABLE_TLS"),
            tls_skip_verify: env_bool("TLS_SKIP_VERIFY"),
            server_override: None,
        }
    }

    /// Builds the log-store URL from `es_endpoint` and the TLS flag.
    pub fn es_url(&self) -> String {
        let addr = self.es_endpoint.trim();
        if addr.contains("://") {
            return addr.to_string();
        }
        let scheme = if self.enable_tls { "https" } else { "http" };
        format!("{scheme}://{addr}")
    }
}

/// Clamps a locally configured interval to the permitted range.
pub fn clamp_interval(requested: u64) -> u64 {
    if requested < MIN_INTERVAL_SECS {
        tracing::warn!(
            requested,
            min = MIN_INTERVAL_SECS,
            "collection interval too low, using minimum"
        );
        MIN_INTERVAL_SECS
    } else if requested > MAX_INTERVAL_SECS {
        tracing::warn!(
            requested,
            max = MAX_INTERVAL_SECS,
            "collection interval too high, using maximum"
        );
        MAX_INTERVAL_SECS
    } else {
        requested
    }
}

/// Validates a server-proposed interval. Unlike the startup interval,
/// out-of-range server values are rejected, not clamped, so a misbehaving
/// backend cannot push the agent past the operator's configured bounds.
pub fn accept_override_interval(proposed: u64) -> Option<u64> {
    (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS)
        .contains(&proposed)
        .then_some(proposed)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_bool(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| v == "true")
}

fn env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(key, value = %value, "invalid integer in environment, using default");
                default
            }
        },
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_interval_clamps_to_nearest_bound() {
        assert_eq!(clamp_interval(5), 10);
        assert_eq!(clamp_interval(10), 10);
        assert_eq!(clamp_interval(60), 60);
        assert_eq!(clamp_interval(300), 300);
        assert_eq!(clamp_interval(400), 300);
    }

    #[test]
    fn override_interval_rejected_outside_range() {
        assert_eq!(accept_override_interval(5), None);
        assert_eq!(accept_override_interval(301), None);
        assert_eq!(accept_override_interval(10), Some(10));
        assert_eq!(accept_override_interval(300), Some(300));
    }

    fn config_with_es(endpoint: &str, enable_tls: bool) -> AgentConfig {
        AgentConfig {
            tenant_id: "acme".into(),
            api_endpoint: "http://localhost:8000".into(),
            es_endpoint: endpoint.into(),
            bus_url: None,
            bus_user: None,
            bus_password: None,
            use_bus: false,
            interval_secs: 30,
            agent_token: None,
            enable_tls,
            tls_skip_verify: false,
            server_override: None,
        }
    }

    #[test]
    fn es_url_respects_explicit_scheme() {
        let config = config_with_es("https://logs.internal:9200", false);
        assert_eq!(config.es_url(), "https://logs.internal:9200");
    }

    #[test]
    fn es_url_builds_scheme_from_tls_flag() {
        assert_eq!(
            config_with_es("logs.internal:9200", false).es_url(),
            "http://logs.internal:9200"
        );
        assert_eq!(
            config_with_es("logs.internal:9200", true).es_url(),
            "https://logs.internal:9200"
        );
    }
}
