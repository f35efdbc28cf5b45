//! Monitor types and per-instance configuration

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::chains::{is_known_chain, is_known_registry, supports_lending, DEFAULT_REGISTRY};
use crate::errors::{MonitorError, MonitorResult};

lazy_static! {
    static ref ADDRESS_RE: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address regex");
}

/// Checks the `0x` + 40 hex digit address shape.
pub fn is_valid_address(value: &str) -> bool {
    ADDRESS_RE.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum MonitorType {
    PoolTvlChanged,
    NewPoolCreated,
    PoolApyChanged,
    LargeVolumeAlert,
    GaugeRewardsChanged,
    NewGaugeCreated,
    CrvusdSupplyChanged,
    CrvusdAmmVolumeAlert,
    NewLendingVault,
    LendingUtilizationAlert,
}

/// Comparison strategy shared by several monitor types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorFamily {
    PercentChange,
    AbsoluteChange,
    ThresholdCrossing,
    NewEntity,
}

impl MonitorType {
    pub const ALL: [MonitorType; 10] = [
        MonitorType::PoolTvlChanged,
        MonitorType::NewPoolCreated,
        MonitorType::PoolApyChanged,
        MonitorType::LargeVolumeAlert,
        MonitorType::GaugeRewardsChanged,
        MonitorType::NewGaugeCreated,
        MonitorType::CrvusdSupplyChanged,
        MonitorType::CrvusdAmmVolumeAlert,
        MonitorType::NewLendingVault,
        MonitorType::LendingUtilizationAlert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorType::PoolTvlChanged => "poolTvlChanged",
            MonitorType::NewPoolCreated => "newPoolCreated",
            MonitorType::PoolApyChanged => "poolApyChanged",
            MonitorType::LargeVolumeAlert => "largeVolumeAlert",
            MonitorType::GaugeRewardsChanged => "gaugeRewardsChanged",
            MonitorType::NewGaugeCreated => "newGaugeCreated",
            MonitorType::CrvusdSupplyChanged => "crvusdSupplyChanged",
            MonitorType::CrvusdAmmVolumeAlert => "crvusdAmmVolumeAlert",
            MonitorType::NewLendingVault => "newLendingVault",
            MonitorType::LendingUtilizationAlert => "lendingUtilizationAlert",
        }
    }

    pub fn family(&self) -> MonitorFamily {
        match self {
            MonitorType::PoolTvlChanged
            | MonitorType::GaugeRewardsChanged
            | MonitorType::CrvusdSupplyChanged => MonitorFamily::PercentChange,
            MonitorType::PoolApyChanged => MonitorFamily::AbsoluteChange,
            MonitorType::LargeVolumeAlert
            | MonitorType::CrvusdAmmVolumeAlert
            | MonitorType::LendingUtilizationAlert => MonitorFamily::ThresholdCrossing,
            MonitorType::NewPoolCreated
            | MonitorType::NewGaugeCreated
            | MonitorType::NewLendingVault => MonitorFamily::NewEntity,
        }
    }

    /// Threshold used when a monitor definition omits one. Units: percent for
    /// change monitors, APY points for `poolApyChanged`, USD for volume alerts,
    /// percent utilization for lending alerts.
    pub fn default_threshold(&self) -> f64 {
        match self {
            MonitorType::PoolTvlChanged => 10.0,
            MonitorType::PoolApyChanged => 1.0,
            MonitorType::LargeVolumeAlert => 1_000_000.0,
            MonitorType::GaugeRewardsChanged => 5.0,
            MonitorType::CrvusdSupplyChanged => 5.0,
            MonitorType::CrvusdAmmVolumeAlert => 500_000.0,
            MonitorType::LendingUtilizationAlert => 80.0,
            MonitorType::NewPoolCreated
            | MonitorType::NewGaugeCreated
            | MonitorType::NewLendingVault => 0.0,
        }
    }

    pub fn accepts_entity_filter(&self) -> bool {
        matches!(
            self,
            MonitorType::PoolTvlChanged | MonitorType::PoolApyChanged | MonitorType::LargeVolumeAlert
        )
    }

    /// Filters for these types are matched against pool addresses and must be address-shaped.
    pub fn filter_is_address(&self) -> bool {
        matches!(self, MonitorType::PoolApyChanged | MonitorType::LargeVolumeAlert)
    }

    pub fn uses_registry(&self) -> bool {
        matches!(self, MonitorType::PoolTvlChanged | MonitorType::NewPoolCreated)
    }

    pub fn is_lending(&self) -> bool {
        matches!(self, MonitorType::NewLendingVault | MonitorType::LendingUtilizationAlert)
    }
}

impl fmt::Display for MonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitorType {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MonitorType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| MonitorError::UnknownMonitorType(s.to_string()))
    }
}

impl TryFrom<String> for MonitorType {
    type Error = MonitorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn default_network() -> String {
    crate::config::DEFAULT_NETWORK.to_string()
}

/// One configured monitor instance. Built once at setup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    pub monitor_type: MonitorType,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default)]
    pub registry: Option<String>,
    #[serde(default)]
    pub entity_filter: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl MonitorConfig {
    pub fn new(monitor_type: MonitorType, network: impl Into<String>) -> Self {
        Self {
            monitor_type,
            network: network.into(),
            registry: None,
            entity_filter: None,
            threshold: None,
        }
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn with_entity_filter(mut self, filter: impl Into<String>) -> Self {
        self.entity_filter = Some(filter.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or_else(|| self.monitor_type.default_threshold())
    }

    pub fn registry(&self) -> &str {
        self.registry
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGISTRY)
    }

    /// Entity filter that actually applies to this monitor type.
    pub fn entity_filter(&self) -> Option<&str> {
        if !self.monitor_type.accepts_entity_filter() {
            return None;
        }
        self.entity_filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// True when a filter was configured for a type that cannot apply one.
    pub fn ignores_entity_filter(&self) -> bool {
        self.entity_filter.is_some() && !self.monitor_type.accepts_entity_filter()
    }

    /// Key under which this instance's poll state is persisted.
    pub fn instance_key(&self) -> String {
        let registry = if self.monitor_type.uses_registry() {
            self.registry()
        } else {
            "-"
        };
        format!(
            "{}:{}:{}:{}",
            self.monitor_type,
            self.network,
            registry,
            self.entity_filter().unwrap_or("*"),
        )
    }

    /// Syntactic checks that must pass before any request is made.
    pub fn validate(&self) -> MonitorResult<()> {
        if !is_known_chain(&self.network) {
            return Err(MonitorError::invalid_config(
                "network",
                format!("unknown network '{}'", self.network),
            ));
        }

        if self.monitor_type.is_lending() && !supports_lending(&self.network) {
            return Err(MonitorError::invalid_config(
                "network",
                format!("lending is not available on '{}'", self.network),
            ));
        }

        if self.monitor_type.uses_registry() && !is_known_registry(self.registry()) {
            return Err(MonitorError::invalid_config(
                "registry",
                format!("unknown registry '{}'", self.registry()),
            ));
        }

        let threshold = self.threshold();
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(MonitorError::invalid_config(
                "threshold",
                format!("threshold must be a non-negative number, got {}", threshold),
            ));
        }

        if let Some(filter) = self.entity_filter() {
            if self.monitor_type.filter_is_address() && !is_valid_address(filter) {
                return Err(MonitorError::invalid_config(
                    "entityFilter",
                    format!("'{}' is not a 0x-prefixed 40 hex digit address", filter),
                ));
            }
        }

        Ok(())
    }
}
