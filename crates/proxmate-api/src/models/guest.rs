// Virtual machines, containers and their console/snapshot side channels.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::de;
use crate::error::Error;

/// Which guest namespace an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GuestKind {
    /// QEMU/KVM virtual machine.
    Qemu,
    /// LXC container.
    Lxc,
}

/// Power-state transitions accepted by `status/{action}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GuestAction {
    Start,
    Stop,
    Shutdown,
    Reset,
    Resume,
    Suspend,
}

impl GuestAction {
    pub const ALL: [Self; 6] = [
        Self::Start,
        Self::Stop,
        Self::Shutdown,
        Self::Reset,
        Self::Resume,
        Self::Suspend,
    ];

    /// Parse a user-supplied action name.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        <Self as FromStr>::from_str(raw.trim()).map_err(|_| {
            Error::invalid_input(
                "action",
                format!(
                    "unknown action `{raw}` (expected one of: start, stop, shutdown, reset, resume, suspend)"
                ),
            )
        })
    }

    /// Containers have no hard reset.
    pub fn supported_by(self, kind: GuestKind) -> bool {
        !(kind == GuestKind::Lxc && self == Self::Reset)
    }
}

// ── VirtualMachine ──────────────────────────────────────────────────

/// Entry of `GET /nodes/{node}/qemu`, also the shape of `status/current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMachine {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub vmid: u32,
    #[serde(default)]
    pub name: Option<String>,
    /// `running` or `stopped`.
    #[serde(default)]
    pub status: String,
    /// Finer-grained state from the QEMU monitor (`paused`, `prelaunch`, ...).
    #[serde(default)]
    pub qmpstatus: Option<String>,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub cpus: f64,
    #[serde(default)]
    pub mem: u64,
    #[serde(default)]
    pub maxmem: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub maxdisk: u64,
    #[serde(default)]
    pub diskread: u64,
    #[serde(default)]
    pub diskwrite: u64,
    #[serde(default)]
    pub netin: u64,
    #[serde(default)]
    pub netout: u64,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub template: bool,
    /// Semicolon-separated tag list as stored by the server.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub lock: Option<String>,
    #[serde(default)]
    pub running_machine: Option<String>,
    #[serde(default)]
    pub running_qemu: Option<String>,
}

impl VirtualMachine {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("VM {}", self.vmid))
    }
}

/// Entry of `GET /nodes/{node}/lxc`, also the shape of `status/current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(deserialize_with = "de::lenient_u32")]
    pub vmid: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub cpus: f64,
    #[serde(default)]
    pub mem: u64,
    #[serde(default)]
    pub maxmem: u64,
    #[serde(default)]
    pub swap: u64,
    #[serde(default)]
    pub maxswap: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub maxdisk: u64,
    #[serde(default)]
    pub diskread: u64,
    #[serde(default)]
    pub diskwrite: u64,
    #[serde(default)]
    pub netin: u64,
    #[serde(default)]
    pub netout: u64,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub template: bool,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub lock: Option<String>,
}

impl Container {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("CT {}", self.vmid))
    }
}

// ── Create requests ─────────────────────────────────────────────────

/// Body of `POST /nodes/{node}/qemu`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmCreateRequest {
    pub vmid: u32,
    pub name: String,
    pub cores: u32,
    /// MiB.
    pub memory: u32,
    pub ostype: String,
    pub scsi0: String,
    pub net0: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sockets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ide2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "de::opt_flag_as_int",
        deserialize_with = "de::opt_flag"
    )]
    pub start: Option<bool>,
}

impl VmCreateRequest {
    /// One core, 512 MiB, a 32 GiB disk on `local-lvm` and a virtio NIC on `vmbr0`.
    pub fn new(vmid: u32, name: impl Into<String>) -> Self {
        Self {
            vmid,
            name: name.into(),
            cores: 1,
            memory: 512,
            ostype: "l26".into(),
            scsi0: "local-lvm:32".into(),
            net0: "virtio,bridge=vmbr0".into(),
            sockets: None,
            ide2: None,
            description: None,
            start: None,
        }
    }
}

/// Body of `POST /nodes/{node}/lxc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerCreateRequest {
    pub vmid: u32,
    pub hostname: String,
    /// Template volume, e.g. `local:vztmpl/debian-12-standard_12.7-1_amd64.tar.zst`.
    pub ostemplate: String,
    pub cores: u32,
    pub memory: u32,
    pub rootfs: String,
    pub net0: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "de::opt_flag_as_int",
        deserialize_with = "de::opt_flag"
    )]
    pub unprivileged: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "de::opt_flag_as_int",
        deserialize_with = "de::opt_flag"
    )]
    pub start: Option<bool>,
}

impl ContainerCreateRequest {
    pub fn new(vmid: u32, hostname: impl Into<String>, ostemplate: impl Into<String>) -> Self {
        Self {
            vmid,
            hostname: hostname.into(),
            ostemplate: ostemplate.into(),
            cores: 1,
            memory: 512,
            rootfs: "local-lvm:8".into(),
            net0: "name=eth0,bridge=vmbr0,ip=dhcp".into(),
            swap: None,
            description: None,
            unprivileged: None,
            start: None,
        }
    }
}

// ── Snapshots ───────────────────────────────────────────────────────

/// Entry of `GET /nodes/{node}/qemu/{vmid}/snapshot`.
///
/// The list always contains a pseudo-entry named `current` for the live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub snaptime: Option<i64>,
    #[serde(default, deserialize_with = "de::flag")]
    pub vmstate: bool,
}

impl Snapshot {
    pub fn is_current(&self) -> bool {
        self.name == "current"
    }
}

/// Body of `POST /nodes/{node}/qemu/{vmid}/snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCreateRequest {
    pub snapname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Include RAM state.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "de::opt_flag_as_int",
        deserialize_with = "de::opt_flag"
    )]
    pub vmstate: Option<bool>,
}

impl SnapshotCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            snapname: name.into(),
            description: None,
            vmstate: None,
        }
    }
}

// ── Console ─────────────────────────────────────────────────────────

/// Result of `POST .../vncproxy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VncTicket {
    pub ticket: String,
    #[serde(deserialize_with = "de::lenient_u32")]
    pub port: u32,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub cert: Option<String>,
    #[serde(default)]
    pub upid: Option<String>,
}
