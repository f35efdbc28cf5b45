//! Snapshot types: one decoded fetch of an entity collection

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    /// Stable identity used to match the entity across snapshots.
    pub id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    /// The observable the monitor compares (TVL, APY, volume, utilization...).
    pub value: f64,
    /// Extra source fields carried into emitted events.
    pub details: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            address: None,
            value,
            details: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Records in the order the API returned them.
    Entities(Vec<EntityRecord>),
    /// Single-value sources such as crvUSD total supply.
    Scalar(f64),
}

impl Snapshot {
    pub fn len(&self) -> usize {
        match self {
            Snapshot::Entities(records) => records.len(),
            Snapshot::Scalar(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
