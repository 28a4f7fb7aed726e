// Transit types for PVE payloads and request bodies.
//
// These mirror the wire format closely and carry no client-side state.
// Fields use `#[serde(default)]` liberally because PVE omits fields that
// don't apply to a resource's current state (stopped guests have no
// uptime, offline nodes have no usage).

pub(crate) mod de;

mod access;
mod cluster;
mod guest;
mod network;
mod node;
mod storage;
mod system;
mod task;

pub use access::{User, UserCreateRequest, UserUpdateRequest};
pub use cluster::{
    ClusterNode, ClusterResource, ClusterStatusEntry, ClusterSummary, HaResource, HaStatusEntry,
    ResourceType,
};
pub use guest::{
    Container, ContainerCreateRequest, GuestAction, GuestKind, Snapshot, SnapshotCreateRequest,
    VirtualMachine, VmCreateRequest, VncTicket,
};
pub use network::NetworkInterface;
pub use node::{CpuInfo, MemoryUsage, Node, NodeStatus, RootFs, RrdDataPoint, SwapUsage, Timeframe};
pub use storage::{
    Backup, BackupCompression, BackupCreateRequest, BackupMode, BrowseEntry, Storage,
    StorageContent,
};
pub use system::{
    FirewallAlias, FirewallRule, NodeDns, NodeTime, NodeVersion, ReplicationJob, VersionInfo,
};
pub use task::{Task, TaskQuery, TaskStatus, Upid};
