//! Resilient Curve API client

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints::{ApiRequest, BaseApi, Endpoint, PathParams};
use super::retry::{retry_on_rate_limit, RetryPolicy};
use crate::config::{Config, DEFAULT_API_BASE_URL, DEFAULT_CORE_API_URL, DEFAULT_TIMEOUT_MS};
use crate::errors::{MonitorError, MonitorResult};

const ERROR_BODY_PREVIEW: usize = 200;

/// Unwraps `{ "success": true, "data": ... }` envelopes. Anything else,
/// including `success: false`, is returned as decoded.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.get("success").and_then(Value::as_bool) == Some(true) && map.contains_key("data") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn has_body(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Holds only immutable configuration; clones share the connection pool and
/// can issue independent requests concurrently.
#[derive(Debug, Clone)]
pub struct CurveApiClient {
    http: reqwest::Client,
    api_base_url: String,
    core_api_url: String,
    retry: RetryPolicy,
    timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CurveApiClientBuilder {
    api_base_url: String,
    core_api_url: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl Default for CurveApiClientBuilder {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            core_api_url: DEFAULT_CORE_API_URL.to_string(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl CurveApiClientBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn core_api_url(mut self, url: impl Into<String>) -> Self {
        self.core_api_url = url.into();
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> MonitorResult<CurveApiClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                warn!("⚠️ Failed to initialize HTTP client: {}", e);
                MonitorError::RequestFailed {
                    endpoint: self.api_base_url.clone(),
                    message: "Failed to build HTTP client".to_string(),
                    status: None,
                    source: Some(e.into()),
                }
            })?;

        Ok(CurveApiClient {
            http,
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            core_api_url: self.core_api_url.trim_end_matches('/').to_string(),
            retry: self.retry,
            timeout: self.timeout,
        })
    }
}

impl CurveApiClient {
    pub fn builder() -> CurveApiClientBuilder {
        CurveApiClientBuilder::default()
    }

    pub fn from_config(config: &Config) -> MonitorResult<Self> {
        Self::builder()
            .api_base_url(&config.api_base_url)
            .core_api_url(&config.core_api_url)
            .retry_policy(RetryPolicy::from_config(config))
            .timeout(config.request_timeout())
            .build()
    }

    pub fn base_url(&self, base: BaseApi) -> &str {
        match base {
            BaseApi::Main => &self.api_base_url,
            BaseApi::Core => &self.core_api_url,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET a templated endpoint on the base it belongs to.
    pub async fn get(&self, endpoint: Endpoint, params: &PathParams) -> MonitorResult<Value> {
        let request = ApiRequest::for_endpoint(endpoint, params)?;
        self.request(&request).await
    }

    /// Sends `request`, retrying on HTTP 429 with exponential backoff, and
    /// returns the decoded body with any success envelope removed.
    pub async fn request(&self, request: &ApiRequest) -> MonitorResult<Value> {
        let url = format!("{}{}", self.base_url(request.base), request.path);
        debug!(method = %request.method, url = %url, "Curve API request");

        retry_on_rate_limit(
            || self.send_once(request, &url),
            &self.retry,
            &request.path,
        )
        .await
    }

    async fn send_once(&self, request: &ApiRequest, url: &str) -> MonitorResult<Value> {
        let endpoint = request.path.as_str();

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .timeout(request.timeout.unwrap_or(self.timeout));

        if let Some(body) = request.body.as_ref().filter(|b| has_body(b)) {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| MonitorError::RequestFailed {
            endpoint: endpoint.to_string(),
            message: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            },
            status: e.status().map(|s| s.as_u16()),
            source: Some(e.into()),
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MonitorError::RateLimited {
                endpoint: endpoint.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            warn!("⚠️ Curve API returned error status {} for {}: {}", status, endpoint, preview);
            return Err(MonitorError::RequestFailed {
                endpoint: endpoint.to_string(),
                message: format!("HTTP {}", status),
                status: Some(status.as_u16()),
                source: None,
            });
        }

        let bytes = response.bytes().await.map_err(|e| MonitorError::RequestFailed {
            endpoint: endpoint.to_string(),
            message: "failed to read response body".to_string(),
            status: Some(status.as_u16()),
            source: Some(e.into()),
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| MonitorError::RequestFailed {
            endpoint: endpoint.to_string(),
            message: "response is not valid JSON".to_string(),
            status: Some(status.as_u16()),
            source: Some(e.into()),
        })?;

        Ok(unwrap_envelope(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_success_envelope() {
        let body = json!({"success": true, "data": {"poolData": []}, "generatedTimeMs": 1});
        assert_eq!(unwrap_envelope(body), json!({"poolData": []}));
    }

    #[test]
    fn leaves_other_shapes_verbatim() {
        let failed = json!({"success": false, "data": {"poolData": []}});
        assert_eq!(unwrap_envelope(failed.clone()), failed);

        let bare = json!({"gauges": {}});
        assert_eq!(unwrap_envelope(bare.clone()), bare);

        let no_data = json!({"success": true});
        assert_eq!(unwrap_envelope(no_data.clone()), no_data);

        assert_eq!(unwrap_envelope(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn builder_trims_trailing_slashes() {
        let client = CurveApiClient::builder()
            .api_base_url("https://api.example.test/v1/")
            .core_api_url("https://core.example.test/v1")
            .build()
            .unwrap();
        assert_eq!(client.base_url(BaseApi::Main), "https://api.example.test/v1");
        assert_eq!(client.base_url(BaseApi::Core), "https://core.example.test/v1");
    }
}
