use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use qth_common::QthSnapshot;
use tokio::sync::watch;

use qth_resolver::config;
use qth_resolver::module::acquisition::{
    AcquisitionOrchestrator, FixedSensor, NetworkMonitor, OrchestratorOptions, ReachabilityProbe,
};
use qth_resolver::module::enrichment::HttpEnrichmentGateway;
use qth_resolver::module::reference::{DatasetSource, load_or_absent};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = config::read_config(&config_path)?;

    // Initialize logging
    let _logging_guard =
        qth_resolver::logging::init_logging(&config.log_dir, "qth-resolver", &config.log_level)?;

    tracing::info!("QTH resolver starting...");
    if Path::new(&config_path).exists() {
        tracing::info!("Loaded config from {}", config_path);
    } else {
        tracing::warn!("Config file {} not found, running with defaults", config_path);
    }

    let dataset = load_or_absent(&DatasetSource::parse(&config.dataset.source)).await;

    let monitor = NetworkMonitor::new(config.network.assume_online);
    if let Some(probe) = ReachabilityProbe::from_config(&monitor, &config.network) {
        probe.probe_once().await;
        probe.start();
    }

    let sensor = FixedSensor::from_config(&config.sensor).context("Invalid [sensor] position")?;
    let gateway =
        HttpEnrichmentGateway::new(&config.enrichment).context("Failed to build HTTP client")?;

    let orchestrator = Arc::new(AcquisitionOrchestrator::new(
        Arc::new(sensor),
        Arc::new(gateway),
        dataset,
        monitor.subscribe(),
        OrchestratorOptions::from_config(config),
    ));

    let status_task = tokio::spawn(log_transitions(orchestrator.subscribe()));

    let refresh_secs = config.acquisition.refresh_interval_secs;
    if refresh_secs == 0 {
        orchestrator.refetch().await;
        print_snapshot(&orchestrator.latest())?;
        status_task.abort();
        return Ok(());
    }

    tracing::info!("Refreshing every {} seconds, Ctrl-C to stop", refresh_secs);
    let mut ticker = tokio::time::interval(Duration::from_secs(refresh_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Cycles may overlap when a refresh outlasts the interval.
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator.refetch().await;
                    if let Err(e) = print_snapshot(&orchestrator.latest()) {
                        tracing::error!("Failed to print snapshot: {}", e);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    status_task.abort();
    Ok(())
}

async fn log_transitions(mut rx: watch::Receiver<QthSnapshot>) {
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        tracing::info!("[cycle {}] {}", snapshot.cycle, snapshot.status_message());
    }
}

fn print_snapshot(snapshot: &QthSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    println!("{}", json);
    Ok(())
}
