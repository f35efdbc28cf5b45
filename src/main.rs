//! Curve Monitor - Main Entry Point
//!
//! Host scheduler: polls every configured monitor instance on an interval
//! and records the change events they emit.

use curve_monitor::*;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::time;
use tracing::{info, warn, error};
use curve_monitor::errors::CircuitBreaker;
use curve_monitor::utils::{SessionStats, StartupNotice};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = CONFIG.clone();

    // Initialize logging
    utils::setup_output_directories(&config.output_dir, &config.state_dir)?;
    let _logging_guard = utils::setup_logging(&config.output_dir, config.log_json)?;

    let notice = StartupNotice::default();
    notice.emit();

    info!("🔭 Curve Monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   API: {}", config.api_base_url);
    info!("   Core API: {}", config.core_api_url);
    info!("   Poll Interval: {}s", config.poll_interval_secs);
    info!("   Cycle Timeout: {}s", config.cycle_timeout_secs);
    info!("   Retries: {} (delay {}ms, x{})", config.max_retries, config.retry_delay_ms, config.backoff_multiplier);
    info!("   State Dir: {}", config.state_dir.display());

    let monitors = load_monitors(&config)?;
    if monitors.is_empty() {
        return Err(anyhow::anyhow!("No monitors configured"));
    }

    // Validate before any request goes out
    for monitor in &monitors {
        monitor
            .validate()
            .with_context(|| format!("monitor {}", monitor.instance_key()))?;
        if monitor.ignores_entity_filter() {
            warn!(
                monitor_type = %monitor.monitor_type,
                "Entity filter is not supported for this monitor type and will be ignored"
            );
        }
        info!("   ✅ {} (threshold {})", monitor.instance_key(), monitor.threshold());
    }

    let client = CurveApiClient::from_config(&config)?;
    let store = JsonFileStateStore::new(&config.state_dir)?;
    let poller = Poller::new(SnapshotFetcher::new(client), store);

    let circuit_breaker = CircuitBreaker::new(
        config.max_consecutive_errors,
        config.circuit_breaker_cooldown_secs,
    );
    let start_time = Instant::now();
    let mut stats = SessionStats::default();

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    let shutdown_tx = Arc::new(tokio::sync::Mutex::new(Some(shutdown_tx)));

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        if let Some(tx) = shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
    });

    info!("\n🚀 Starting poll loop for {} monitors...\n", monitors.len());

    let mut interval = time::interval(config.poll_interval());

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !circuit_breaker.can_proceed().await {
                    warn!("Circuit breaker open, skipping poll round");
                    continue;
                }
                for monitor in &monitors {
                    run_monitor_cycle(&poller, monitor, &config, &circuit_breaker, &mut stats).await;
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting poll loop...");
                break;
            }
        }
    }

    utils::print_session_stats(start_time, &stats, &circuit_breaker).await;

    Ok(())
}

/// Monitor definitions: a JSON file of `MonitorConfig`s, or a single
/// monitor described by environment variables.
fn load_monitors(config: &Config) -> Result<Vec<MonitorConfig>> {
    if let Some(path) = &config.monitors_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading monitors file {}", path.display()))?;
        let monitors: Vec<MonitorConfig> = serde_json::from_str(&contents)
            .with_context(|| format!("parsing monitors file {}", path.display()))?;
        return Ok(monitors);
    }

    let monitor_type: MonitorType = config
        .monitor_type
        .as_deref()
        .unwrap_or("poolTvlChanged")
        .parse()?;
    let network = config.network.clone().unwrap_or_else(|| config.default_network.clone());

    let mut monitor = MonitorConfig::new(monitor_type, network);
    if let Some(registry) = &config.registry {
        monitor = monitor.with_registry(registry);
    }
    if let Some(filter) = &config.entity_filter {
        monitor = monitor.with_entity_filter(filter);
    }
    if let Some(threshold) = config.threshold {
        monitor = monitor.with_threshold(threshold);
    }
    Ok(vec![monitor])
}

/// Run a single poll cycle for one monitor instance
async fn run_monitor_cycle<S: SnapshotSource, St: StateStore>(
    poller: &Poller<S, St>,
    monitor: &MonitorConfig,
    config: &Config,
    circuit_breaker: &CircuitBreaker,
    stats: &mut SessionStats,
) {
    stats.cycles += 1;
    let key = monitor.instance_key();

    match time::timeout(config.cycle_timeout(), poller.poll_once(monitor)).await {
        Ok(Ok(events)) => {
            circuit_breaker.record_success().await;
            if events.is_empty() {
                return;
            }

            stats.events_emitted += events.len() as u64;
            *stats.events_by_monitor.entry(monitor.monitor_type.to_string()).or_insert(0) += events.len() as u64;

            for event in &events {
                info!("🔔 {}", event.summary());
            }
            if let Err(e) = storage::save_change_events(&config.output_dir, &events) {
                error!(monitor = %key, "Failed to save change events: {}", e);
            }
        }
        Ok(Err(e)) => {
            stats.failed_cycles += 1;
            *stats.errors_by_kind.entry(e.kind().to_string()).or_insert(0) += 1;
            error!(monitor = %key, kind = e.kind(), "Poll cycle failed: {}", e);
            circuit_breaker.record_error().await;
        }
        Err(_) => {
            stats.failed_cycles += 1;
            *stats.errors_by_kind.entry("timeout".to_string()).or_insert(0) += 1;
            error!(monitor = %key, "Poll cycle timed out after {}s", config.cycle_timeout_secs);
            circuit_breaker.record_error().await;
        }
    }
}
