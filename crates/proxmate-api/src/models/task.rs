use std::fmt;

use serde::{Deserialize, Serialize};

use super::de;

/// Unique process id of a background task.
///
/// Format: `UPID:{node}:{pid}:{pstart}:{starttime}:{type}:{id}:{user}:`.
/// The value is treated as opaque except for the accessors below.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Upid(String);

impl Upid {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn field(&self, index: usize) -> Option<&str> {
        let mut parts = self.0.split(':');
        if parts.next() != Some("UPID") {
            return None;
        }
        parts.nth(index).filter(|s| !s.is_empty())
    }

    /// Node that runs the task.
    pub fn node(&self) -> Option<&str> {
        self.field(0)
    }

    /// Task type (`qmstart`, `vzdump`, `qmsnapshot`, ...).
    pub fn task_type(&self) -> Option<&str> {
        self.field(4)
    }

    pub fn user(&self) -> Option<&str> {
        self.field(6)
    }
}

impl fmt::Display for Upid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Upid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Upid {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Entry of `GET /nodes/{node}/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub upid: Upid,
    #[serde(default)]
    pub node: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    /// Guest id or other object the task acts on.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub starttime: i64,
    #[serde(default)]
    pub endtime: Option<i64>,
    /// Exit status once finished (`OK`, an error text, ...).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub pid: Option<u64>,
    #[serde(default)]
    pub pstart: Option<u64>,
    #[serde(default, deserialize_with = "de::flag")]
    pub saved: bool,
}

impl Task {
    pub fn is_running(&self) -> bool {
        self.endtime.is_none()
    }
}

/// `GET /nodes/{node}/tasks/{upid}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub upid: Option<Upid>,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(rename = "type", default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    /// `running` or `stopped`.
    pub status: String,
    #[serde(default)]
    pub exitstatus: Option<String>,
    #[serde(default)]
    pub starttime: Option<i64>,
    #[serde(default)]
    pub pid: Option<u64>,
}

impl TaskStatus {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    /// `Some(true)` once stopped with exit status `OK`, `None` while running.
    pub fn succeeded(&self) -> Option<bool> {
        if self.is_running() {
            None
        } else {
            Some(self.exitstatus.as_deref() == Some("OK"))
        }
    }
}

/// Filter and paging for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskQuery {
    pub limit: u32,
    pub start: u32,
    pub vmid: Option<u32>,
    pub errors_only: bool,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            start: 0,
            vmid: None,
            errors_only: false,
        }
    }
}

impl TaskQuery {
    pub(crate) fn to_params(self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("start", self.start.to_string()),
        ];
        if let Some(vmid) = self.vmid {
            params.push(("vmid", vmid.to_string()));
        }
        if self.errors_only {
            params.push(("errors", "1".to_owned()));
        }
        params
    }
}
