use crate::Collector;
use anyhow::Result;
use hostpulse_common::types::{MetricRecord, RecordContext};
use sysinfo::Disks;

pub struct DiskCollector {
    disks: Disks,
}

impl DiskCollector {
    pub fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for DiskCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for DiskCollector {
    fn name(&self) -> &str {
        "disk"
    }

    fn collect(&mut self, ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
        self.disks.refresh();
        let mut records = Vec::new();

        for disk in self.disks.iter() {
            let total = disk.total_space();
            let available = disk.available_space();
            let used = total.saturating_sub(available);
            let usage_pct = if total > 0 {
                (used as f64 / total as f64) * 100.0
            } else {
                0.0
            };

            records.push(
                MetricRecord::new("disk", ctx)
                    .with("device", disk.name().to_string_lossy().to_string())
                    .with("mountpoint", disk.mount_point().to_string_lossy().to_string())
                    .with("total", total)
                    .with("used", used)
                    .with("free", available)
                    .with("percent", usage_pct),
            );
        }

        Ok(records)
    }
}
