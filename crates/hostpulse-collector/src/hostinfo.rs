use crate::Collector;
use anyhow::Result;
use hostpulse_common::types::{MetricRecord, RecordContext};
use sysinfo::{ProcessesToUpdate, System};

pub struct HostInfoCollector {
    system: System,
}

impl HostInfoCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for HostInfoCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for HostInfoCollector {
    fn name(&self) -> &str {
        "hostinfo"
    }

    fn collect(&mut self, ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
        self.system.refresh_processes(ProcessesToUpdate::All);

        Ok(vec![MetricRecord::new("hostinfo", ctx)
            .with("os", std::env::consts::OS)
            .with("platform", System::name().unwrap_or_else(|| "unknown".to_string()))
            .with(
                "platform_version",
                System::os_version().unwrap_or_else(|| "unknown".to_string()),
            )
            .with(
                "kernel_version",
                System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            )
            .with("kernel_arch", std::env::consts::ARCH)
            .with("uptime", System::uptime())
            .with("boot_time", System::boot_time())
            .with("procs", self.system.processes().len())])
    }
}
