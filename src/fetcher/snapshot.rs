//! Snapshot fetcher backed by the resilient client

use std::future::Future;
use tracing::debug;

use super::bindings::{binding_for, path_params};
use super::extract::extract_snapshot;
use crate::errors::MonitorResult;
use crate::network::CurveApiClient;
use crate::types::{MonitorConfig, Snapshot};

/// Source of snapshots for a monitor instance.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self, config: &MonitorConfig) -> impl Future<Output = MonitorResult<Snapshot>> + Send;
}

#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    client: CurveApiClient,
}

impl SnapshotFetcher {
    pub fn new(client: CurveApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CurveApiClient {
        &self.client
    }
}

impl SnapshotSource for SnapshotFetcher {
    async fn fetch(&self, config: &MonitorConfig) -> MonitorResult<Snapshot> {
        let binding = binding_for(config.monitor_type);
        let payload = self.client.get(binding.endpoint, &path_params(config)).await?;
        let snapshot = extract_snapshot(&payload, &binding)?;

        debug!(
            monitor_type = %config.monitor_type,
            network = %config.network,
            records = snapshot.len(),
            "Fetched snapshot"
        );
        Ok(snapshot)
    }
}
