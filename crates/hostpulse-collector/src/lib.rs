//! Metric collection framework for the hostpulse agent.
//!
//! Each [`Collector`] implementation gathers one category of system metrics
//! (CPU, memory, disk, network, processes, host info) and returns them as
//! [`MetricRecord`]s ready for delivery. [`collect_all`] wraps the
//! collectors in the degradation policy: a source that fails or comes back
//! empty contributes a fixed fallback record instead of failing the cycle.

pub mod cpu;
pub mod disk;
mod fallback;
pub mod hostinfo;
pub mod memory;
pub mod network;
pub mod process;

use anyhow::Result;
use hostpulse_common::types::{MetricRecord, RecordContext};

/// A system metric collector that runs on the agent host.
///
/// Implementations hold whatever refreshed `sysinfo` state they need and are
/// called once per collection interval.
pub trait Collector: Send + Sync {
    /// Returns the collector name (e.g., `"cpu"`, `"disk"`), used for
    /// logging and for fallback lookup.
    fn name(&self) -> &str;

    /// Collects current metric records for the cycle described by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying system API call fails. Callers
    /// going through [`collect_all`] substitute a fallback record instead
    /// of surfacing the error.
    fn collect(&mut self, ctx: &RecordContext) -> Result<Vec<MetricRecord>>;
}

/// Returns the default collector set used by the agent.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(cpu::CpuCollector::new()),
        Box::new(memory::MemoryCollector::new()),
        Box::new(disk::DiskCollector::new()),
        Box::new(network::NetworkCollector::new()),
        Box::new(process::ProcessCollector::new()),
        Box::new(hostinfo::HostInfoCollector::new()),
    ]
}

/// Runs every collector, substituting one fallback record per source that
/// fails or produces nothing. Never fails the cycle.
pub fn collect_all(collectors: &mut [Box<dyn Collector>], ctx: &RecordContext) -> Vec<MetricRecord> {
    let mut records = Vec::new();

    for collector in collectors.iter_mut() {
        match collector.collect(ctx) {
            Ok(recs) if !recs.is_empty() => records.extend(recs),
            Ok(_) => {
                tracing::debug!(collector = collector.name(), "no data, using fallback record");
                records.push(fallback::fallback_record(collector.name(), ctx));
            }
            Err(e) => {
                tracing::warn!(
                    collector = collector.name(),
                    error = %e,
                    "collection failed, using fallback record"
                );
                records.push(fallback::fallback_record(collector.name(), ctx));
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct EmptyCollector;

    impl Collector for EmptyCollector {
        fn name(&self) -> &str {
            "cpu"
        }
        fn collect(&mut self, _ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
            Ok(Vec::new())
        }
    }

    struct BrokenCollector;

    impl Collector for BrokenCollector {
        fn name(&self) -> &str {
            "memory"
        }
        fn collect(&mut self, _ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
            bail!("simulated platform failure")
        }
    }

    struct OneRecordCollector;

    impl Collector for OneRecordCollector {
        fn name(&self) -> &str {
            "disk"
        }
        fn collect(&mut self, ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
            Ok(vec![MetricRecord::new("disk", ctx)])
        }
    }

    #[test]
    fn failing_collector_yields_fallback_record() {
        let ctx = RecordContext::now("acme", "web-01");
        let mut collectors: Vec<Box<dyn Collector>> = vec![Box::new(BrokenCollector)];

        let records = collect_all(&mut collectors, &ctx);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("metric_type").unwrap(), "memory");
        assert_eq!(records[0].get("tenant_id").unwrap(), "acme");
    }

    #[test]
    fn empty_collector_yields_fallback_record() {
        let ctx = RecordContext::now("acme", "web-01");
        let mut collectors: Vec<Box<dyn Collector>> = vec![Box::new(EmptyCollector)];

        let records = collect_all(&mut collectors, &ctx);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("metric_type").unwrap(), "cpu");
        assert!(records[0].get("cpu_percent").is_some());
    }

    #[test]
    fn healthy_collectors_pass_records_through() {
        let ctx = RecordContext::now("acme", "web-01");
        let mut collectors: Vec<Box<dyn Collector>> =
            vec![Box::new(OneRecordCollector), Box::new(BrokenCollector)];

        let records = collect_all(&mut collectors, &ctx);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("metric_type").unwrap(), "disk");
        assert_eq!(records[1].get("metric_type").unwrap(), "memory");
    }

    #[test]
    fn fallback_records_keep_full_field_shape() {
        let ctx = RecordContext::now("acme", "web-01");

        let cpu = fallback::fallback_record("cpu", &ctx);
        assert!(cpu.get("cpu_iowait").is_some());

        let network = fallback::fallback_record("network", &ctx);
        assert!(network.get("drops_in").is_some());
        assert!(network.get("drops_out").is_some());

        let hostinfo = fallback::fallback_record("hostinfo", &ctx);
        let boot_time = hostinfo.get("boot_time").unwrap().as_u64().unwrap();
        assert!(boot_time > 0);
        assert!(hostinfo.get("uptime").is_some());
    }

    #[test]
    fn fallback_table_covers_default_collector_set() {
        let ctx = RecordContext::now("acme", "web-01");
        for name in ["cpu", "memory", "disk", "network", "process", "hostinfo"] {
            let rec = fallback::fallback_record(name, &ctx);
            assert_eq!(rec.get("metric_type").unwrap(), name);
            assert_eq!(rec.get("host").unwrap(), "web-01");
            // Every fallback must carry payload fields beyond the common four
            let json = serde_json::to_value(&rec).unwrap();
            assert!(json.as_object().unwrap().len() > 4, "fallback {name} has no payload");
        }
    }
}
