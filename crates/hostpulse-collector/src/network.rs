use crate::Collector;
use anyhow::Result;
use hostpulse_common::types::{MetricRecord, RecordContext};
use std::collections::HashMap;
use sysinfo::Networks;

pub struct NetworkCollector {
    networks: Networks,
    prev_received: HashMap<String, u64>,
    prev_transmitted: HashMap<String, u64>,
    prev_packets_received: HashMap<String, u64>,
    prev_packets_transmitted: HashMap<String, u64>,
}

impl NetworkCollector {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            prev_received: HashMap::new(),
            prev_transmitted: HashMap::new(),
            prev_packets_received: HashMap::new(),
            prev_packets_transmitted: HashMap::new(),
        }
    }
}

impl Default for NetworkCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for NetworkCollector {
    fn name(&self) -> &str {
        "network"
    }

    fn collect(&mut self, ctx: &RecordContext) -> Result<Vec<MetricRecord>> {
        self.networks.refresh();
        let mut records = Vec::new();

        for (name, data) in self.networks.iter() {
            let received = data.total_received();
            let transmitted = data.total_transmitted();
            let packets_received = data.total_packets_received();
            let packets_transmitted = data.total_packets_transmitted();

            // Delta since the previous cycle; first observation reports zero
            let rx_delta =
                received.saturating_sub(*self.prev_received.get(name).unwrap_or(&received));
            let tx_delta = transmitted
                .saturating_sub(*self.prev_transmitted.get(name).unwrap_or(&transmitted));
            let prx_delta = packets_received.saturating_sub(
                *self
                    .prev_packets_received
                    .get(name)
                    .unwrap_or(&packets_received),
            );
            let ptx_delta = packets_transmitted.saturating_sub(
                *self
                    .prev_packets_transmitted
                    .get(name)
                    .unwrap_or(&packets_transmitted),
            );

            self.prev_received.insert(name.clone(), received);
            self.prev_transmitted.insert(name.clone(), transmitted);
            self.prev_packets_received
                .insert(name.clone(), packets_received);
            self.prev_packets_transmitted
                .insert(name.clone(), packets_transmitted);

            records.push(
                MetricRecord::new("network", ctx)
                    .with("interface", name.clone())
                    .with("bytes_recv", rx_delta)
                    .with("bytes_sent", tx_delta)
                    .with("packets_recv", prx_delta)
                    .with("packets_sent", ptx_delta)
                    .with("errors_in", data.total_errors_on_received())
                    .with("errors_out", data.total_errors_on_transmitted()),
            );
        }

        Ok(records)
    }
}
