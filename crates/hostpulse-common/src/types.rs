use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One metric record as produced by a collector for a single cycle.
///
/// The record is an opaque JSON object; the backend does not prescribe a
/// schema beyond the four common fields (`metric_type`, `timestamp`,
/// `tenant_id`, `host`) that [`MetricRecord::new`] always fills in.
///
/// # Examples
///
/// ```
/// use hostpulse_common::types::{MetricRecord, RecordContext};
///
/// let ctx = RecordContext::now("acme", "web-01");
/// let rec = MetricRecord::new("cpu", &ctx).with("cpu_percent", 45.5);
/// assert_eq!(rec.get("metric_type").unwrap(), "cpu");
/// assert_eq!(rec.get("host").unwrap(), "web-01");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord(Map<String, Value>);

impl MetricRecord {
    /// Creates a record of the given type with the common fields filled in.
    pub fn new(metric_type: &str, ctx: &RecordContext) -> Self {
        let mut fields = Map::new();
        fields.insert("metric_type".to_string(), Value::from(metric_type));
        fields.insert("timestamp".to_string(), Value::from(ctx.timestamp.clone()));
        fields.insert("tenant_id".to_string(), Value::from(ctx.tenant_id.clone()));
        fields.insert("host".to_string(), Value::from(ctx.host.clone()));
        Self(fields)
    }

    /// Adds a field, consuming and returning the record for chaining.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Per-cycle context stamped onto every record: tenant, host and one shared
/// RFC3339 UTC timestamp so all records of a cycle carry the same instant.
#[derive(Debug, Clone)]
pub struct RecordContext {
    pub tenant_id: String,
    pub host: String,
    pub timestamp: String,
}

impl RecordContext {
    pub fn now(tenant_id: &str, host: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            host: host.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Stable per-host identity, generated once at startup and never mutated.
///
/// Every field degrades to a fixed sentinel when the underlying OS query
/// fails; generation itself can never fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fingerprint {
    pub hostname: String,
    pub machine_uuid: String,
    pub primary_mac: String,
    pub primary_ip: String,
    pub os: String,
    pub os_version: String,
    pub architecture: String,
}

impl Fingerprint {
    /// Composite identity string used for registration and topic naming.
    ///
    /// # Examples
    ///
    /// ```
    /// use hostpulse_common::types::Fingerprint;
    ///
    /// let fp = Fingerprint {
    ///     hostname: "web-01".into(),
    ///     machine_uuid: "abc123".into(),
    ///     primary_mac: "aa:bb:cc:dd:ee:ff".into(),
    ///     primary_ip: "10.0.0.5".into(),
    ///     os: "linux".into(),
    ///     os_version: "6.1".into(),
    ///     architecture: "x86_64".into(),
    /// };
    /// assert_eq!(fp.composite(), "web-01:abc123:aa:bb:cc:dd:ee:ff:10.0.0.5");
    /// ```
    pub fn composite(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.hostname, self.machine_uuid, self.primary_mac, self.primary_ip
        )
    }
}

/// Server-pushed configuration fragment pulled before each cycle.
///
/// `ignore_alerts` is stored but not acted on yet; it is reserved for
/// server-driven alert suppression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerOverride {
    #[serde(default)]
    pub collection_interval_sec: u64,
    #[serde(default)]
    pub ignore_logs: bool,
    #[serde(default)]
    pub ignore_alerts: bool,
}

/// One agent log document shipped to the bulk log endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub tenant_id: String,
    pub host: String,
    pub level: String,
    pub message: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    /// Builds an info-level record stamped with the current time.
    pub fn info(tenant_id: &str, host: &str, message: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tenant_id: tenant_id.to_string(),
            host: host.to_string(),
            level: "info".to_string(),
            message: message.to_string(),
            fields: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_record_carries_common_fields() {
        let ctx = RecordContext::now("acme", "web-01");
        let rec = MetricRecord::new("memory", &ctx);

        assert_eq!(rec.get("metric_type").unwrap(), "memory");
        assert_eq!(rec.get("tenant_id").unwrap(), "acme");
        assert_eq!(rec.get("host").unwrap(), "web-01");
        assert!(rec.get("timestamp").unwrap().is_string());
    }

    #[test]
    fn metric_record_serializes_as_flat_object() {
        let ctx = RecordContext::now("acme", "web-01");
        let rec = MetricRecord::new("cpu", &ctx).with("cpu_percent", 12.5);
        let json = serde_json::to_value(&rec).unwrap();

        assert_eq!(json["metric_type"], "cpu");
        assert_eq!(json["cpu_percent"], 12.5);
        // Newtype must be transparent: no wrapper key in the output
        assert!(json.as_object().unwrap().len() >= 5);
    }

    #[test]
    fn server_override_decodes_with_missing_fields() {
        let cfg: ServerOverride = serde_json::from_str(r#"{"collection_interval_sec": 60}"#).unwrap();
        assert_eq!(cfg.collection_interval_sec, 60);
        assert!(!cfg.ignore_logs);
        assert!(!cfg.ignore_alerts);
    }

    #[test]
    fn log_record_flattens_extra_fields() {
        let rec = LogRecord::info("acme", "web-01", "cycle done").with("source", "hostpulse-agent");
        let json = serde_json::to_value(&rec).unwrap();

        assert_eq!(json["source"], "hostpulse-agent");
        assert_eq!(json["level"], "info");
        assert!(json.get("@timestamp").is_some());
        assert!(json.get("fields").is_none());
    }
}
