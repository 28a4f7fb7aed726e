use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::de;

/// Entry of `GET /cluster/status`: one cluster summary plus one entry per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClusterStatusEntry {
    Cluster(ClusterSummary),
    Node(ClusterNode),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: u32,
    #[serde(default, deserialize_with = "de::flag")]
    pub quorate: bool,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub nodeid: Option<u32>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub local: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub online: bool,
    #[serde(default)]
    pub level: Option<String>,
}

/// Resource class filter for `GET /cluster/resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceType {
    Vm,
    Storage,
    Node,
    Sdn,
}

/// Entry of `GET /cluster/resources`.
///
/// The row shape depends on `type` (`qemu`, `lxc`, `node`, `storage`,
/// `sdn`, `pool`, ...); fields not modelled here are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub vmid: Option<u32>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub maxcpu: Option<f64>,
    #[serde(default)]
    pub mem: Option<u64>,
    #[serde(default)]
    pub maxmem: Option<u64>,
    #[serde(default)]
    pub disk: Option<u64>,
    #[serde(default)]
    pub maxdisk: Option<u64>,
    #[serde(default)]
    pub uptime: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── High availability ───────────────────────────────────────────────

/// Entry of `GET /cluster/ha/status/current` (quorum, master, LRM and service rows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaStatusEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Service id (`vm:100`) for service rows.
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub crm_state: Option<String>,
    #[serde(default)]
    pub request_state: Option<String>,
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub quorate: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Entry of `GET /cluster/ha/resources`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaResource {
    pub sid: String,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub max_restart: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub max_relocate: Option<u32>,
}
