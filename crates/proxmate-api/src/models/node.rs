use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::de;

/// Entry of `GET /nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node: String,
    /// `online`, `offline` or `unknown`.
    #[serde(default)]
    pub status: String,
    /// CPU usage ratio (0.0..=1.0 per core set).
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub maxcpu: u32,
    #[serde(default)]
    pub mem: u64,
    #[serde(default)]
    pub maxmem: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub maxdisk: u64,
    #[serde(default)]
    pub uptime: u64,
    /// Subscription level, empty without a subscription.
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub ssl_fingerprint: Option<String>,
}

impl Node {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }

    pub fn memory_ratio(&self) -> f64 {
        ratio(self.mem, self.maxmem)
    }
}

/// `GET /nodes/{node}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    #[serde(default)]
    pub cpu: f64,
    #[serde(default, deserialize_with = "de::lenient_f64_seq")]
    pub loadavg: Vec<f64>,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub kversion: Option<String>,
    #[serde(default)]
    pub pveversion: Option<String>,
    #[serde(default)]
    pub idle: f64,
    #[serde(default)]
    pub wait: f64,
    pub memory: MemoryUsage,
    pub swap: SwapUsage,
    pub rootfs: RootFs,
    #[serde(default)]
    pub cpuinfo: Option<CpuInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub free: u64,
}

impl MemoryUsage {
    pub fn ratio(&self) -> f64 {
        ratio(self.used, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapUsage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub free: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFs {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub free: u64,
    #[serde(default)]
    pub avail: u64,
}

impl RootFs {
    pub fn ratio(&self) -> f64 {
        ratio(self.used, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub cpus: u32,
    #[serde(default)]
    pub cores: u32,
    #[serde(default)]
    pub sockets: u32,
    #[serde(default)]
    pub mhz: Option<String>,
}

// ── RRD ─────────────────────────────────────────────────────────────

/// Resolution window for `rrddata` endpoints.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Timeframe {
    #[default]
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// One sample of an `rrddata` series.
///
/// The metric set depends on the resource (node, guest, storage), so every
/// value other than the timestamp is kept by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrdDataPoint {
    pub time: u64,
    #[serde(flatten)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl RrdDataPoint {
    /// Numeric value of `metric`, if the sample carries one.
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).and_then(serde_json::Value::as_f64)
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub(crate) fn ratio(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn node_status_decodes_string_loadavg() {
        let status: NodeStatus = serde_json::from_value(json!({
            "cpu": 0.03,
            "loadavg": ["0.50", "0.40", "0.30"],
            "uptime": 86400,
            "pveversion": "pve-manager/8.2.4/faa83925c9641325",
            "memory": { "total": 8_589_934_592_u64, "used": 4_294_967_296_u64, "free": 4_294_967_296_u64 },
            "swap": { "total": 0, "used": 0, "free": 0 },
            "rootfs": { "total": 100, "used": 25, "free": 75, "avail": 70 }
        }))
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(status.loadavg, vec![0.5, 0.4, 0.3]);
        assert!((status.memory.ratio() - 0.5).abs() < f64::EPSILON);
        assert!((status.rootfs.ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn rrd_point_keeps_metrics() {
        let point: RrdDataPoint =
            serde_json::from_value(json!({ "time": 1_700_000_000, "cpu": 0.12, "netin": 1024 }))
                .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(point.value("cpu"), Some(0.12));
        assert_eq!(point.value("netin"), Some(1024.0));
        assert_eq!(point.value("missing"), None);
    }

    #[test]
    fn timeframe_parses_case_insensitively() {
        assert_eq!("Day".parse::<Timeframe>().ok(), Some(Timeframe::Day));
        assert_eq!(Timeframe::default().as_ref(), "hour");
    }
}
