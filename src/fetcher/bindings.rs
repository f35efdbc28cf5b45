//! Where each monitor type reads its data from

use crate::network::{Endpoint, PathParams};
use crate::types::{MonitorConfig, MonitorType};

/// How the records of a collection are laid out in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionLayout {
    /// JSON array of objects; identity read from `identity_field`.
    Array,
    /// JSON object keyed by identity.
    Keyed,
    /// Single numeric field.
    Scalar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotBinding {
    pub endpoint: Endpoint,
    pub collection_field: &'static str,
    pub layout: CollectionLayout,
    pub identity_field: &'static str,
    /// Observable fields tried in order; the first present one wins.
    pub value_fields: &'static [&'static str],
    /// Extra fields copied into event details.
    pub detail_fields: &'static [&'static str],
}

pub fn binding_for(monitor_type: MonitorType) -> SnapshotBinding {
    match monitor_type {
        MonitorType::PoolTvlChanged | MonitorType::NewPoolCreated => SnapshotBinding {
            endpoint: Endpoint::PoolsByRegistry,
            collection_field: "poolData",
            layout: CollectionLayout::Array,
            identity_field: "id",
            value_fields: &["usdTotal", "usdTotalExcludingBasePool"],
            detail_fields: &[],
        },
        MonitorType::PoolApyChanged => SnapshotBinding {
            endpoint: Endpoint::SubgraphData,
            collection_field: "poolList",
            layout: CollectionLayout::Array,
            identity_field: "address",
            value_fields: &["latestDailyApy"],
            detail_fields: &["latestWeeklyApy", "volumeUSD"],
        },
        MonitorType::LargeVolumeAlert => SnapshotBinding {
            endpoint: Endpoint::Volumes,
            collection_field: "pools",
            layout: CollectionLayout::Array,
            identity_field: "address",
            value_fields: &["volumeUSD"],
            detail_fields: &[],
        },
        MonitorType::GaugeRewardsChanged => SnapshotBinding {
            endpoint: Endpoint::FactoryGauges,
            collection_field: "gauges",
            layout: CollectionLayout::Array,
            identity_field: "gauge",
            value_fields: &["crvRewardsApy"],
            detail_fields: &["poolAddress"],
        },
        MonitorType::NewGaugeCreated => SnapshotBinding {
            endpoint: Endpoint::AllGauges,
            collection_field: "gauges",
            layout: CollectionLayout::Keyed,
            identity_field: "gauge",
            value_fields: &[],
            detail_fields: &["poolAddress", "type", "side_chain"],
        },
        MonitorType::CrvusdSupplyChanged => SnapshotBinding {
            endpoint: Endpoint::CrvusdTotalSupply,
            collection_field: "crvusdTotalSupply",
            layout: CollectionLayout::Scalar,
            identity_field: "",
            value_fields: &[],
            detail_fields: &[],
        },
        MonitorType::CrvusdAmmVolumeAlert => SnapshotBinding {
            endpoint: Endpoint::CrvusdAmmMarkets,
            collection_field: "markets",
            layout: CollectionLayout::Array,
            identity_field: "address",
            value_fields: &["ammVolume"],
            detail_fields: &[],
        },
        MonitorType::NewLendingVault | MonitorType::LendingUtilizationAlert => SnapshotBinding {
            endpoint: Endpoint::LendingVaultsByChain,
            collection_field: "lendingVaultData",
            layout: CollectionLayout::Array,
            identity_field: "id",
            value_fields: &["utilizationPercent"],
            detail_fields: &["totalDeposited"],
        },
    }
}

/// Path parameters for a monitor instance's endpoint.
pub fn path_params(config: &MonitorConfig) -> PathParams {
    let params = PathParams::chain(config.network.clone());
    if config.monitor_type.uses_registry() {
        params.with_registry(config.registry())
    } else {
        params
    }
}
