use super::{Access, PveClient, require_non_blank};
use crate::error::Error;
use crate::models::{
    FirewallAlias, FirewallRule, NodeDns, NodeTime, NodeVersion, ReplicationJob, VersionInfo,
};

impl PveClient {
    /// API version; answered without a session.
    ///
    /// `GET /version`
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        self.get_object(self.endpoint(&["version"]), &[], Access::Public)
            .await
    }

    /// `GET /nodes/{node}/version`
    pub async fn node_version(&self, node: &str) -> Result<NodeVersion, Error> {
        self.node_object(node, &["version"]).await
    }

    /// `GET /nodes/{node}/dns`
    pub async fn node_dns(&self, node: &str) -> Result<NodeDns, Error> {
        self.node_object(node, &["dns"]).await
    }

    /// `GET /nodes/{node}/time`
    pub async fn node_time(&self, node: &str) -> Result<NodeTime, Error> {
        self.node_object(node, &["time"]).await
    }

    /// `GET /nodes/{node}/firewall/rules`
    pub async fn firewall_rules(&self, node: &str) -> Result<Vec<FirewallRule>, Error> {
        let node = require_non_blank("node", node)?;
        self.get_list(self.endpoint(&["nodes", node, "firewall", "rules"]), &[])
            .await
    }

    /// `GET /nodes/{node}/firewall/aliases`
    pub async fn firewall_aliases(&self, node: &str) -> Result<Vec<FirewallAlias>, Error> {
        let node = require_non_blank("node", node)?;
        self.get_list(self.endpoint(&["nodes", node, "firewall", "aliases"]), &[])
            .await
    }

    /// `GET /nodes/{node}/replication`
    pub async fn replication_jobs(&self, node: &str) -> Result<Vec<ReplicationJob>, Error> {
        let node = require_non_blank("node", node)?;
        self.get_list(self.endpoint(&["nodes", node, "replication"]), &[])
            .await
    }

    async fn node_object<T: serde::de::DeserializeOwned>(
        &self,
        node: &str,
        rest: &[&str],
    ) -> Result<T, Error> {
        let node = require_non_blank("node", node)?;
        let mut segments = vec!["nodes", node];
        segments.extend_from_slice(rest);
        self.get_object(self.endpoint(&segments), &[], Access::Authenticated)
            .await
    }
}
