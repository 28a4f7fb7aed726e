// Version, DNS, time, firewall and replication payloads.

use serde::{Deserialize, Serialize};

use super::de;

/// `GET /version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub repoid: Option<String>,
}

/// `GET /nodes/{node}/version`; same shape as the cluster-wide version.
pub type NodeVersion = VersionInfo;

/// `GET /nodes/{node}/dns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDns {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub dns1: Option<String>,
    #[serde(default)]
    pub dns2: Option<String>,
    #[serde(default)]
    pub dns3: Option<String>,
}

impl NodeDns {
    pub fn servers(&self) -> Vec<&str> {
        [&self.dns1, &self.dns2, &self.dns3]
            .into_iter()
            .filter_map(Option::as_deref)
            .collect()
    }
}

/// `GET /nodes/{node}/time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTime {
    pub timezone: String,
    /// Seconds since the epoch, UTC.
    pub time: i64,
    pub localtime: i64,
}

/// Entry of `GET /nodes/{node}/firewall/rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    pub pos: u32,
    /// `in`, `out` or `group`.
    #[serde(rename = "type")]
    pub rule_type: String,
    /// `ACCEPT`, `DROP`, `REJECT` or a security group name.
    pub action: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub enable: bool,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub proto: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub dport: Option<String>,
    #[serde(default)]
    pub iface: Option<String>,
    #[serde(default, rename = "macro")]
    pub macro_name: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Entry of `GET /nodes/{node}/firewall/aliases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallAlias {
    pub name: String,
    pub cidr: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
}

/// Entry of `GET /nodes/{node}/replication`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationJob {
    /// `{vmid}-{jobnum}`.
    pub id: String,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub guest: Option<u32>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub last_sync: Option<i64>,
    #[serde(default)]
    pub next_sync: Option<i64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub fail_count: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub disable: bool,
}
