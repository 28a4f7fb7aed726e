use super::PveClient;
use crate::error::Error;
use crate::models::{ClusterResource, ClusterStatusEntry, HaResource, HaStatusEntry, ResourceType};

impl PveClient {
    /// Quorum summary and per-node membership.
    ///
    /// `GET /cluster/status`
    pub async fn cluster_status(&self) -> Result<Vec<ClusterStatusEntry>, Error> {
        self.get_list(self.endpoint(&["cluster", "status"]), &[])
            .await
    }

    /// Every guest, storage and node in the cluster, optionally filtered.
    ///
    /// `GET /cluster/resources?type=`
    pub async fn cluster_resources(
        &self,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<ClusterResource>, Error> {
        let query: Vec<(&str, String)> = resource_type
            .map(|t| ("type", t.to_string()))
            .into_iter()
            .collect();
        self.get_list(self.endpoint(&["cluster", "resources"]), &query)
            .await
    }

    /// `GET /cluster/ha/status/current`
    pub async fn ha_status(&self) -> Result<Vec<HaStatusEntry>, Error> {
        self.get_list(self.endpoint(&["cluster", "ha", "status", "current"]), &[])
            .await
    }

    /// `GET /cluster/ha/resources`
    pub async fn ha_resources(&self) -> Result<Vec<HaResource>, Error> {
        self.get_list(self.endpoint(&["cluster", "ha", "resources"]), &[])
            .await
    }
}
