//! Display and printing utilities

use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};
use crate::errors::CircuitBreaker;

/// Renders a USD-style amount with a K/M/B suffix and two decimals.
pub fn format_large_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}

/// Parses a percentage or plain number given as text, e.g. `"4.2%"`.
pub fn parse_percentage(value: &str) -> Option<f64> {
    value
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Running counters for the poll host.
#[derive(Debug, Default)]
pub struct SessionStats {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub events_emitted: u64,
    pub events_by_monitor: HashMap<String, u64>,
    pub errors_by_kind: HashMap<String, u32>,
}

pub async fn print_session_stats(
    start_time: Instant,
    stats: &SessionStats,
    circuit_breaker: &CircuitBreaker,
) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   🔁 POLLING:");
    info!("     Cycles run: {}", stats.cycles);
    info!("     Failed cycles: {}", stats.failed_cycles);
    info!("     Success rate: {:.1}%",
        if stats.cycles > 0 {
            ((stats.cycles - stats.failed_cycles) as f64 / stats.cycles as f64) * 100.0
        } else {
            0.0
        }
    );

    info!("   🔔 EVENTS:");
    info!("     Total emitted: {}", stats.events_emitted);
    for (monitor, count) in &stats.events_by_monitor {
        info!("     {}: {}", monitor, count);
    }

    info!("   ⚙️  SYSTEM:");
    info!("     Circuit breaker: {}",
        if circuit_breaker.is_open().await { "OPEN" } else { "CLOSED" }
    );
    if !stats.errors_by_kind.is_empty() {
        warn!("     Errors by kind:");
        for (kind, count) in &stats.errors_by_kind {
            warn!("       {}: {}", kind, count);
        }
    }
}
