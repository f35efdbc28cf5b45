//! Change events emitted by a poll cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::monitor::{MonitorConfig, MonitorType};
use super::snapshot::EntityRecord;
use crate::utils::format_large_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub id: String,
    pub monitor_type: MonitorType,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<f64>,
    pub current_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_absolute: Option<f64>,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(config: &MonitorConfig, current_value: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            monitor_type: config.monitor_type,
            network: config.network.clone(),
            registry: config
                .monitor_type
                .uses_registry()
                .then(|| config.registry().to_string()),
            entity_id: None,
            entity_name: None,
            entity_address: None,
            previous_value: None,
            current_value,
            change_percent: None,
            change_absolute: None,
            threshold: config.threshold(),
            details: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn for_entity(config: &MonitorConfig, record: &EntityRecord) -> Self {
        let mut event = Self::new(config, record.value);
        event.entity_id = Some(record.id.clone());
        event.entity_name = record.name.clone();
        event.entity_address = record.address.clone();
        event.details = record.details.clone();
        event
    }

    pub fn with_previous(mut self, previous: f64) -> Self {
        self.previous_value = Some(previous);
        self
    }

    pub fn with_change_percent(mut self, change: f64) -> Self {
        self.change_percent = Some(change);
        self
    }

    pub fn with_change_absolute(mut self, change: f64) -> Self {
        self.change_absolute = Some(change);
        self
    }

    fn label(&self) -> &str {
        self.entity_name
            .as_deref()
            .or(self.entity_id.as_deref())
            .unwrap_or("crvUSD")
    }

    /// One-line description suitable for a notification body.
    pub fn summary(&self) -> String {
        let label = self.label();
        match self.monitor_type {
            MonitorType::PoolTvlChanged
            | MonitorType::GaugeRewardsChanged
            | MonitorType::CrvusdSupplyChanged => format!(
                "[{}] {}: {} -> {} ({:+.2}%)",
                self.monitor_type,
                label,
                format_large_number(self.previous_value.unwrap_or_default()),
                format_large_number(self.current_value),
                self.change_percent.unwrap_or_default(),
            ),
            MonitorType::PoolApyChanged => format!(
                "[{}] {}: APY {:.2}% -> {:.2}% ({:+.2} pts)",
                self.monitor_type,
                label,
                self.previous_value.unwrap_or_default(),
                self.current_value,
                self.change_absolute.unwrap_or_default(),
            ),
            MonitorType::LargeVolumeAlert
            | MonitorType::CrvusdAmmVolumeAlert
            | MonitorType::LendingUtilizationAlert => format!(
                "[{}] {}: {} crossed threshold {}",
                self.monitor_type,
                label,
                format_large_number(self.current_value),
                format_large_number(self.threshold),
            ),
            MonitorType::NewPoolCreated
            | MonitorType::NewGaugeCreated
            | MonitorType::NewLendingVault => format!(
                "[{}] new entity {} on {}",
                self.monitor_type, label, self.network,
            ),
        }
    }
}
