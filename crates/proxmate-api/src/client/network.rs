use super::{Access, PveClient, require_non_blank};
use crate::error::Error;
use crate::models::NetworkInterface;

impl PveClient {
    /// `GET /nodes/{node}/network`
    pub async fn network_interfaces(&self, node: &str) -> Result<Vec<NetworkInterface>, Error> {
        let node = require_non_blank("node", node)?;
        self.get_list(self.endpoint(&["nodes", node, "network"]), &[])
            .await
    }

    /// `GET /nodes/{node}/network/{iface}`
    pub async fn network_interface(
        &self,
        node: &str,
        iface: &str,
    ) -> Result<NetworkInterface, Error> {
        let node = require_non_blank("node", node)?;
        let iface = require_non_blank("iface", iface)?;
        let mut interface: NetworkInterface = self
            .get_object(
                self.endpoint(&["nodes", node, "network", iface]),
                &[],
                Access::Authenticated,
            )
            .await?;
        // The single-interface payload omits its own name.
        if interface.iface.is_empty() {
            iface.clone_into(&mut interface.iface);
        }
        Ok(interface)
    }
}
