use super::{Access, PveClient, require_non_blank};
use crate::error::Error;
use crate::models::{Node, NodeStatus, RrdDataPoint, Timeframe};

impl PveClient {
    /// List cluster members.
    ///
    /// `GET /nodes`
    pub async fn nodes(&self) -> Result<Vec<Node>, Error> {
        self.get_list(self.endpoint(&["nodes"]), &[]).await
    }

    /// Load, memory, swap and root filesystem usage of one node.
    ///
    /// `GET /nodes/{node}/status`
    pub async fn node_status(&self, node: &str) -> Result<NodeStatus, Error> {
        let node = require_non_blank("node", node)?;
        self.get_object(
            self.endpoint(&["nodes", node, "status"]),
            &[],
            Access::Authenticated,
        )
        .await
    }

    /// `GET /nodes/{node}/rrddata?timeframe=...`
    pub async fn node_rrd(
        &self,
        node: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<RrdDataPoint>, Error> {
        let node = require_non_blank("node", node)?;
        self.get_list(
            self.endpoint(&["nodes", node, "rrddata"]),
            &rrd_params(timeframe),
        )
        .await
    }
}

pub(super) fn rrd_params(timeframe: Timeframe) -> [(&'static str, String); 2] {
    [
        ("timeframe", timeframe.to_string()),
        ("cf", "AVERAGE".to_owned()),
    ]
}
