//! Monitor configuration settings and environment variable handling

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Curve API endpoints
pub const DEFAULT_API_BASE_URL: &str = "https://api.curve.finance/v1";
pub const DEFAULT_CORE_API_URL: &str = "https://api-core.curve.finance/v1";
pub const DEFAULT_NETWORK: &str = "ethereum";

// Rate limit handling
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const MAX_RETRIES_LIMIT: u32 = 10;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 30_000;
pub const MAX_RETRY_DELAY_LIMIT_MS: u64 = 300_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// Poll loop
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub core_api_url: String,
    pub default_network: String,
    // Resilient client
    pub retry_delay_ms: u64,
    pub max_retries: u32,
    pub backoff_multiplier: f64,
    pub max_retry_delay_ms: u64,
    pub request_timeout_ms: u64,
    // Poll loop
    pub poll_interval_secs: u64,
    pub cycle_timeout_secs: u64,
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,
    // Persistence
    pub state_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_json: bool,
    // Monitor definitions
    pub monitors_file: Option<PathBuf>,
    pub monitor_type: Option<String>,
    pub network: Option<String>,
    pub registry: Option<String>,
    pub entity_filter: Option<String>,
    pub threshold: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            core_api_url: DEFAULT_CORE_API_URL.to_string(),
            default_network: DEFAULT_NETWORK.to_string(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            cycle_timeout_secs: DEFAULT_CYCLE_TIMEOUT_SECS,
            max_consecutive_errors: 5,
            circuit_breaker_cooldown_secs: 300, // 5 minutes
            state_dir: PathBuf::from("output/state"),
            output_dir: PathBuf::from("output"),
            log_json: false,
            monitors_file: None,
            monitor_type: None,
            network: None,
            registry: None,
            entity_filter: None,
            threshold: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        let retry_delay_ms = parsed_var("RETRY_DELAY_MS").unwrap_or(DEFAULT_RETRY_DELAY_MS);
        Self {
            api_base_url: non_empty_var("CURVE_API_BASE_URL")
                .unwrap_or(defaults.api_base_url),
            core_api_url: non_empty_var("CURVE_CORE_API_URL")
                .unwrap_or(defaults.core_api_url),
            default_network: non_empty_var("DEFAULT_NETWORK")
                .unwrap_or(defaults.default_network),
            retry_delay_ms,
            max_retries: parsed_var("MAX_RETRIES")
                .unwrap_or(DEFAULT_MAX_RETRIES)
                .clamp(1, MAX_RETRIES_LIMIT),
            backoff_multiplier: parsed_var::<f64>("BACKOFF_MULTIPLIER")
                .filter(|m| m.is_finite())
                .unwrap_or(DEFAULT_BACKOFF_MULTIPLIER)
                .max(1.0),
            max_retry_delay_ms: parsed_var("MAX_RETRY_DELAY_MS")
                .unwrap_or(DEFAULT_MAX_RETRY_DELAY_MS)
                .clamp(retry_delay_ms.min(MAX_RETRY_DELAY_LIMIT_MS), MAX_RETRY_DELAY_LIMIT_MS),
            request_timeout_ms: parsed_var("REQUEST_TIMEOUT_MS")
                .unwrap_or(DEFAULT_TIMEOUT_MS)
                .max(100),
            poll_interval_secs: parsed_var("POLL_INTERVAL_SECS")
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
                .max(MIN_POLL_INTERVAL_SECS),
            cycle_timeout_secs: parsed_var("CYCLE_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_CYCLE_TIMEOUT_SECS)
                .max(1),
            max_consecutive_errors: parsed_var("MAX_CONSECUTIVE_ERRORS")
                .unwrap_or(defaults.max_consecutive_errors),
            circuit_breaker_cooldown_secs: parsed_var("CIRCUIT_BREAKER_COOLDOWN_SECS")
                .unwrap_or(defaults.circuit_breaker_cooldown_secs),
            state_dir: non_empty_var("STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_dir),
            output_dir: non_empty_var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            log_json: non_empty_var("LOG_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
            monitors_file: non_empty_var("MONITORS_FILE").map(PathBuf::from),
            monitor_type: non_empty_var("MONITOR_TYPE"),
            network: non_empty_var("NETWORK"),
            registry: non_empty_var("REGISTRY"),
            entity_filter: non_empty_var("ENTITY_FILTER"),
            threshold: parsed_var("THRESHOLD"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_api_rate_limits() {
        let config = Config::default();
        assert_eq!(config.retry_delay(), Duration::from_millis(1000));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_multiplier, 2.0);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.core_api_url, DEFAULT_CORE_API_URL);
    }
}
