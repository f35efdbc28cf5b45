//! Custom error types for the monitor engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    /// HTTP 429 from the API. Handled inside the client's backoff loop and
    /// only visible to callers of the raw retry helper.
    #[error("Rate limited by Curve API: {endpoint}")]
    RateLimited {
        endpoint: String,
    },

    #[error("Curve API request failed: {message} (endpoint: {endpoint})")]
    RequestFailed {
        endpoint: String,
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Max retries exceeded for Curve API request after {attempts} attempts (endpoint: {endpoint})")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
    },

    #[error("Invalid monitor configuration: {field} - {reason}")]
    InvalidConfiguration {
        field: String,
        reason: String,
    },

    #[error("Unknown monitor type: {0}")]
    UnknownMonitorType(String),

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Poll state store error: {key} - {message}")]
    State {
        key: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl MonitorError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MonitorError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn request_failed(endpoint: &str, message: impl Into<String>) -> Self {
        MonitorError::RequestFailed {
            endpoint: endpoint.to_string(),
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, MonitorError::RateLimited { .. })
    }

    /// Short label used for error counters.
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorError::RateLimited { .. } => "rate_limited",
            MonitorError::RequestFailed { .. } => "request_failed",
            MonitorError::RetriesExhausted { .. } => "retries_exhausted",
            MonitorError::InvalidConfiguration { .. } => "invalid_configuration",
            MonitorError::UnknownMonitorType(_) => "unknown_monitor_type",
            MonitorError::DataParsing { .. } => "parse_error",
            MonitorError::State { .. } => "state_store",
        }
    }

    /// Endpoint path carried by request-level failures.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            MonitorError::RateLimited { endpoint }
            | MonitorError::RequestFailed { endpoint, .. }
            | MonitorError::RetriesExhausted { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failures_carry_endpoint() {
        let err = MonitorError::request_failed("/getPools/ethereum/main", "HTTP 500");
        assert_eq!(err.endpoint(), Some("/getPools/ethereum/main"));
        assert!(err.to_string().contains("/getPools/ethereum/main"));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn config_errors_have_no_endpoint() {
        let err = MonitorError::invalid_config("entity_filter", "not an address");
        assert!(err.endpoint().is_none());
        assert!(err.to_string().contains("entity_filter"));
    }
}
