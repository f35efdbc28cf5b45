//! Endpoint templates and request descriptions

use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

use crate::errors::{MonitorError, MonitorResult};

/// Which configured base URL a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseApi {
    #[default]
    Main,
    Core,
}

/// Endpoints consumed by the snapshot fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    PoolsByRegistry,
    AllPoolsOnChain,
    SubgraphData,
    Volumes,
    FactoryGauges,
    AllGauges,
    CrvusdTotalSupply,
    CrvusdAmmMarkets,
    LendingVaultsByChain,
}

impl Endpoint {
    pub fn template(&self) -> &'static str {
        match self {
            Endpoint::PoolsByRegistry => "/getPools/{chain}/{registry}",
            Endpoint::AllPoolsOnChain => "/getPools/all/{chain}",
            Endpoint::SubgraphData => "/getSubgraphData/{chain}",
            Endpoint::Volumes => "/getVolumes/{chain}",
            Endpoint::FactoryGauges => "/getFactoryGauges/{chain}",
            Endpoint::AllGauges => "/getAllGauges",
            Endpoint::CrvusdTotalSupply => "/getCrvusdTotalSupply",
            Endpoint::CrvusdAmmMarkets => "/crvusd/markets/{chain}",
            Endpoint::LendingVaultsByChain => "/getLendingVaults/all/{chain}",
        }
    }

    pub fn base(&self) -> BaseApi {
        match self {
            Endpoint::CrvusdAmmMarkets => BaseApi::Core,
            _ => BaseApi::Main,
        }
    }
}

/// Values substituted into an endpoint template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pub chain: Option<String>,
    pub registry: Option<String>,
    pub address: Option<String>,
}

impl PathParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn chain(chain: impl Into<String>) -> Self {
        Self {
            chain: Some(chain.into()),
            ..Self::default()
        }
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Substitutes `{chain}`, `{registry}` and `{address}` placeholders.
pub fn render_path(template: &str, params: &PathParams) -> MonitorResult<String> {
    let mut path = template.to_string();
    for (placeholder, value) in [
        ("{chain}", &params.chain),
        ("{registry}", &params.registry),
        ("{address}", &params.address),
    ] {
        if !path.contains(placeholder) {
            continue;
        }
        let value = value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                MonitorError::invalid_config(
                    placeholder.trim_matches(|c| c == '{' || c == '}'),
                    format!("required by endpoint {}", template),
                )
            })?;
        if value.contains('/') || value.contains('?') || value.contains('#') {
            return Err(MonitorError::invalid_config(
                placeholder.trim_matches(|c| c == '{' || c == '}'),
                format!("'{}' is not a valid path segment", value),
            ));
        }
        path = path.replace(placeholder, value);
    }
    Ok(path)
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub base: BaseApi,
    pub path: String,
    pub method: Method,
    pub body: Option<Value>,
    /// Overrides the client's default timeout.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            base: BaseApi::Main,
            path: path.into(),
            method: Method::GET,
            body: None,
            timeout: None,
        }
    }

    pub fn for_endpoint(endpoint: Endpoint, params: &PathParams) -> MonitorResult<Self> {
        Ok(Self::get(render_path(endpoint.template(), params)?).with_base(endpoint.base()))
    }

    pub fn with_base(mut self, base: BaseApi) -> Self {
        self.base = base;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_registry_template() {
        let params = PathParams::chain("ethereum").with_registry("factory-crypto");
        let request = ApiRequest::for_endpoint(Endpoint::PoolsByRegistry, &params).unwrap();
        assert_eq!(request.path, "/getPools/ethereum/factory-crypto");
        assert_eq!(request.base, BaseApi::Main);
        assert_eq!(request.method, Method::GET);
    }

    #[test]
    fn amm_markets_use_core_base() {
        let request = ApiRequest::for_endpoint(Endpoint::CrvusdAmmMarkets, &PathParams::chain("ethereum")).unwrap();
        assert_eq!(request.path, "/crvusd/markets/ethereum");
        assert_eq!(request.base, BaseApi::Core);
    }

    #[test]
    fn parameterless_templates_ignore_params() {
        let path = render_path(Endpoint::AllGauges.template(), &PathParams::chain("ethereum")).unwrap();
        assert_eq!(path, "/getAllGauges");
    }

    #[test]
    fn missing_or_unsafe_params_are_rejected() {
        let err = render_path(Endpoint::Volumes.template(), &PathParams::none()).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidConfiguration { ref field, .. } if field == "chain"));

        let params = PathParams::chain("ethereum/../x");
        assert!(render_path(Endpoint::Volumes.template(), &params).is_err());
    }
}
