use serde::{Deserialize, Serialize};

use super::de;

/// Entry of `GET /nodes/{node}/network` and `GET /nodes/{node}/network/{iface}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    #[serde(default)]
    pub iface: String,
    /// `eth`, `bridge`, `bond`, `vlan`, `OVSBridge`, ...
    #[serde(rename = "type", default)]
    pub iface_type: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub method6: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub bridge_ports: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub autostart: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub exists: bool,
    #[serde(default)]
    pub families: Vec<String>,
    #[serde(default)]
    pub comments: Option<String>,
}
