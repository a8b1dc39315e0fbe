use crate::Collector;
use anyhow::Result;
use hostpulse_common::types::{MetricRecord, RecordContext};
use sysinfo::System;

pub struct MemoryCollector {
    system: System,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for MemoryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for MemoryCollector {
    fn name(&self) -> &str {
        "memory"
    }

    fn collect(&mut self, ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let usage_pct = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let swap_total = self.system.total_swap();
        let swap_used = self.system.used_swap();
        let swap_pct = if swap_total > 0 {
            (swap_used as f64 / swap_total as f64) * 100.0
        } else {
            0.0
        };

        Ok(vec![MetricRecord::new("memory", ctx)
            .with("memory_total", total)
            .with("memory_used", used)
            .with("memory_free", self.system.free_memory())
            .with("memory_percent", usage_pct)
            .with("swap_total", swap_total)
            .with("swap_used", swap_used)
            .with("swap_free", self.system.free_swap())
            .with("swap_percent", swap_pct)])
    }
}
