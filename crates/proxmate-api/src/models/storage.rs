use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::de;
use super::node::ratio;

/// Entry of `GET /nodes/{node}/storage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub storage: String,
    /// Backend type (`dir`, `lvmthin`, `zfspool`, `nfs`, ...).
    #[serde(rename = "type", default)]
    pub storage_type: String,
    /// Content kinds the storage accepts (`images`, `rootdir`, `iso`, `backup`, ...).
    #[serde(default, deserialize_with = "de::comma_list")]
    pub content: Vec<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub shared: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub enabled: bool,
    #[serde(default, alias = "available")]
    pub avail: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub total: u64,
}

impl Storage {
    pub fn usage_ratio(&self) -> f64 {
        ratio(self.used, self.total)
    }

    pub fn accepts(&self, content: &str) -> bool {
        self.content.iter().any(|c| c == content)
    }
}

/// Entry of `GET /nodes/{node}/storage/{storage}/content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageContent {
    /// Volume id, `storage:path`.
    pub volid: String,
    /// Content kind (`backup`, `images`, `iso`, `vztmpl`, ...).
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub used: Option<u64>,
    #[serde(default)]
    pub ctime: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_lenient_u32")]
    pub vmid: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub protected: bool,
}

/// Backup archives are storage content entries with `content == "backup"`.
pub type Backup = StorageContent;

impl StorageContent {
    pub fn is_backup(&self) -> bool {
        self.content == "backup"
    }
}

/// Entry of `GET /nodes/{node}/storage/{storage}/browse`.
///
/// The listing format differs between backends, so only the common fields
/// are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseEntry {
    #[serde(alias = "filename", alias = "text")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mtime: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Backup request ──────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackupMode {
    #[default]
    Snapshot,
    Suspend,
    Stop,
}

/// Archive compression. `None` is encoded as `"0"` on the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum BackupCompression {
    #[serde(rename = "0")]
    #[strum(to_string = "none", serialize = "0")]
    None,
    #[serde(rename = "gzip")]
    Gzip,
    #[serde(rename = "lzo")]
    Lzo,
    #[default]
    #[serde(rename = "zstd")]
    Zstd,
}

/// Body of `POST /nodes/{node}/qemu/{vmid}/backup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupCreateRequest {
    pub storage: String,
    #[serde(default)]
    pub mode: BackupMode,
    #[serde(default)]
    pub compress: BackupCompression,
    #[serde(default, rename = "notes-template", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "de::opt_flag_as_int",
        deserialize_with = "de::opt_flag"
    )]
    pub protected: Option<bool>,
}

impl BackupCreateRequest {
    /// Snapshot-mode, zstd-compressed backup to `storage`.
    pub fn new(storage: impl Into<String>) -> Self {
        Self {
            storage: storage.into(),
            mode: BackupMode::default(),
            compress: BackupCompression::default(),
            notes: None,
            protected: None,
        }
    }
}
