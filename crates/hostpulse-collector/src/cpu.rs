use crate::Collector;
use anyhow::Result;
use hostpulse_common::types::{MetricRecord, RecordContext};
use sysinfo::System;

pub struct CpuCollector {
    system: System,
}

impl CpuCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self { system }
    }
}

impl Default for CpuCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for CpuCollector {
    fn name(&self) -> &str {
        "cpu"
    }

    fn collect(&mut self, ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
        self.system.refresh_cpu_all();
        let mut records = Vec::new();

        records.push(
            MetricRecord::new("cpu", ctx)
                .with("cpu_percent", self.system.global_cpu_usage() as f64)
                .with("cpu_count", self.system.cpus().len()),
        );

        for (i, cpu) in self.system.cpus().iter().enumerate() {
            records.push(
                MetricRecord::new("cpu", ctx)
                    .with("core", i)
                    .with("cpu_percent", cpu.cpu_usage() as f64),
            );
        }

        Ok(records)
    }
}
