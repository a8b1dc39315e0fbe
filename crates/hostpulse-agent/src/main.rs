mod config;
mod fingerprint;

use anyhow::Result;
use config::AgentConfig;
use hostpulse_collector::Collector;
use hostpulse_common::types::{LogRecord, RecordContext, ServerOverride};
use hostpulse_delivery::api::ControlPlaneClient;
use hostpulse_delivery::logs::LogShipper;
use hostpulse_delivery::transport::metric_subject;
use hostpulse_delivery::{BusTransport, DeliveryEngine, HttpTransport, MetricSink};
use std::time::Duration;
use tokio::signal;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hostpulse=info".parse()?))
        .init();

    let mut config = AgentConfig::from_env();
    let fp = fingerprint::generate();
    tracing::info!(
        tenant = %config.tenant_id,
        host = %fp.hostname,
        interval_secs = config.interval_secs,
        fingerprint = %fp.composite(),
        "hostpulse-agent starting"
    );

    let control = ControlPlaneClient::new(&config.api_endpoint, config.agent_token.clone());
    match control.register(&config.tenant_id, &fp).await {
        Ok(()) => tracing::info!("agent registered"),
        Err(e) => tracing::warn!(error = %e, "agent registration failed"),
    }

    let bus_sink: Option<Box<dyn MetricSink>> = if config.use_bus {
        connect_bus(&config).await.map(|client| {
            let subject = metric_subject(&config.tenant_id, &fp.hostname);
            Box::new(BusTransport::new(client, subject)) as Box<dyn MetricSink>
        })
    } else {
        None
    };
    let http_sink: Box<dyn MetricSink> = Box::new(HttpTransport::new(
        &config.api_endpoint,
        config.agent_token.clone(),
    ));
    let mut engine = DeliveryEngine::new(bus_sink, http_sink);

    let log_shipper = LogShipper::new(&config.es_url(), config.tls_skip_verify)?;
    let mut collectors = hostpulse_collector::default_collectors();
    let host = fp.hostname.clone();

    // First collection happens immediately, before the first tick
    run_cycle(&mut collectors, &mut engine, &log_shipper, &config, &host).await;

    let mut tick = make_interval(config.interval_secs);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                if let Some(incoming) = control.pull_config(&host).await {
                    if let Some(new_secs) = apply_override(&mut config, incoming) {
                        tick = make_interval(new_secs);
                    }
                }
                run_cycle(&mut collectors, &mut engine, &log_shipper, &config, &host).await;
            }
            _ = signal::ctrl_c() => {
                tracing::info!("shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}

/// Fixed-interval ticker whose first fire is one full period away. Delayed
/// ticks (e.g., when retry sleeps outrun the period) are not bunched up:
/// ticks serialize.
fn make_interval(period_secs: u64) -> Interval {
    let period = Duration::from_secs(period_secs);
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tick
}

async fn connect_bus(config: &AgentConfig) -> Option<async_nats::Client> {
    let url = match &config.bus_url {
        Some(url) => url.clone(),
        None => {
            tracing::warn!("USE_BUS is set but BUS_URL is missing, running HTTP-only");
            return None;
        }
    };

    let mut options = async_nats::ConnectOptions::new().connection_timeout(Duration::from_secs(10));
    if let (Some(user), Some(password)) = (&config.bus_user, &config.bus_password) {
        options = options.user_and_password(user.clone(), password.clone());
    }

    match options.connect(url.as_str()).await {
        Ok(client) => {
            tracing::info!(url = %url, "connected to message bus");
            Some(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "message bus connection failed, running HTTP-only");
            None
        }
    }
}

/// Applies a pulled server override to the run state. Returns the new
/// interval when the server changed it to an in-range value.
fn apply_override(config: &mut AgentConfig, incoming: ServerOverride) -> Option<u64> {
    let mut new_interval = None;

    // 0 means the server did not send an interval
    let proposed = incoming.collection_interval_sec;
    if proposed != 0 && proposed != config.interval_secs {
        match config::accept_override_interval(proposed) {
            Some(secs) => {
                tracing::info!(
                    from = config.interval_secs,
                    to = secs,
                    "server override: changing collection interval"
                );
                config.interval_secs = secs;
                new_interval = Some(secs);
            }
            None => {
                tracing::warn!(
                    requested = proposed,
                    "server override interval out of range, ignoring"
                );
            }
        }
    }

    if incoming.ignore_alerts {
        // Reserved extension point; stored but not acted on
        tracing::debug!("server override requests alert suppression");
    }
    config.server_override = Some(incoming);
    new_interval
}

async fn run_cycle(
    collectors: &mut [Box<dyn Collector>],
    engine: &mut DeliveryEngine,
    log_shipper: &LogShipper,
    config: &AgentConfig,
    host: &str,
) {
    let ctx = RecordContext::now(&config.tenant_id, host);
    let batch = hostpulse_collector::collect_all(collectors, &ctx);
    tracing::debug!(records = batch.len(), "collected metrics");

    match engine.deliver(&batch).await {
        Ok(()) => tracing::info!(records = batch.len(), "metrics delivered"),
        Err(e) => tracing::error!(
            error = %e,
            backoff_secs = engine.backoff_secs(),
            "metric delivery failed, dropping batch"
        ),
    }

    let ignore_logs = config
        .server_override
        .as_ref()
        .is_some_and(|o| o.ignore_logs);
    if !ignore_logs {
        let record = LogRecord::info(&config.tenant_id, host, "agent metrics collection completed")
            .with("source", "hostpulse-agent")
            .with("version", env!("CARGO_PKG_VERSION"));
        if let Err(e) = log_shipper.ship(&record).await {
            tracing::warn!(error = %e, "failed to ship agent log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AgentConfig {
        let mut config = AgentConfig::from_env();
        config.interval_secs = 30;
        config.server_override = None;
        config
    }

    #[test]
    fn in_range_override_changes_interval() {
        let mut config = base_config();
        let incoming = ServerOverride {
            collection_interval_sec: 60,
            ignore_logs: false,
            ignore_alerts: false,
        };
        assert_eq!(apply_override(&mut config, incoming), Some(60));
        assert_eq!(config.interval_secs, 60);
    }

    #[test]
    fn out_of_range_override_leaves_interval_unchanged() {
        let mut config = base_config();
        let incoming = ServerOverride {
            collection_interval_sec: 5,
            ..Default::default()
        };
        assert_eq!(apply_override(&mut config, incoming), None);
        assert_eq!(config.interval_secs, 30);
    }

    #[test]
    fn missing_interval_is_not_an_override() {
        let mut config = base_config();
        let incoming = ServerOverride {
            collection_interval_sec: 0,
            ignore_logs: true,
            ignore_alerts: true,
        };
        assert_eq!(apply_override(&mut config, incoming), None);
        assert_eq!(config.interval_secs, 30);
        // Suppression flags are still recorded
        assert!(config.server_override.as_ref().unwrap().ignore_logs);
    }

    #[test]
    fn same_interval_is_a_no_op() {
        let mut config = base_config();
        let incoming = ServerOverride {
            collection_interval_sec: 30,
            ..Default::default()
        };
        assert_eq!(apply_override(&mut config, incoming), None);
        assert_eq!(config.interval_secs, 30);
    }
}
