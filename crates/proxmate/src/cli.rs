//! Clap derive structures for the `proxmate` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use proxmate_api::models::{GuestAction, ResourceType, Timeframe};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// proxmate -- command-line client for Proxmox VE
#[derive(Debug, Parser)]
#[command(
    name = "proxmate",
    version,
    about = "Manage Proxmox VE clusters from the command line",
    long_about = "A command-line client for the Proxmox VE management API.\n\n\
        Logs in with a ticket session per invocation; credentials come from\n\
        PROXMATE_PASSWORD, the OS keyring, or the config profile.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "PROXMATE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// PVE host name or address (overrides profile)
    #[arg(long, short = 'H', env = "PROXMATE_HOST", global = true)]
    pub host: Option<String>,

    /// API port (default 8006)
    #[arg(long, env = "PROXMATE_PORT", global = true)]
    pub port: Option<u16>,

    /// Login user name, without realm
    #[arg(long, short = 'u', env = "PROXMATE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Authentication realm (pam, pve, ldap, ...)
    #[arg(long, global = true)]
    pub realm: Option<String>,

    /// Talk plain HTTP instead of HTTPS
    #[arg(long, global = true)]
    pub no_https: bool,

    /// Accept self-signed or mismatched TLS certificates
    #[arg(long, short = 'k', env = "PROXMATE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PROXMATE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PROXMATE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify credentials and store them in the OS keyring
    Login(LoginArgs),

    /// Forget the stored credentials of a profile
    Logout,

    /// Show the server's PVE version
    Version,

    /// Inspect cluster nodes
    #[command(alias = "node", alias = "n")]
    Nodes(NodesArgs),

    /// Manage QEMU virtual machines
    #[command(alias = "vm", alias = "qemu")]
    Vms(GuestArgs),

    /// Manage LXC containers
    #[command(alias = "ct", alias = "lxc")]
    Cts(ContainerArgs),

    /// Inspect storages and their content
    #[command(alias = "st")]
    Storage(StorageArgs),

    /// Inspect and stop background tasks
    Tasks(TasksArgs),

    /// Cluster-wide status and resources
    Cluster(ClusterArgs),

    /// Access control users
    Users(UsersArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Also write the connection settings to the config file
    #[arg(long)]
    pub save_profile: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NODES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List cluster nodes
    #[command(alias = "ls")]
    List,

    /// Show CPU, load and version details of a node
    Status {
        /// Node name
        node: String,
    },

    /// Show RRD statistics of a node
    Rrd {
        /// Node name
        node: String,

        #[command(flatten)]
        window: RrdArgs,
    },
}

#[derive(Debug, Args)]
pub struct RrdArgs {
    /// Resolution window
    #[arg(long, short = 't', default_value = "hour", value_parser = parse_timeframe)]
    pub timeframe: Timeframe,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GUESTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GuestArgs {
    #[command(subcommand)]
    pub command: VmsCommand,
}

#[derive(Debug, Subcommand)]
pub enum VmsCommand {
    /// List virtual machines on a node
    #[command(alias = "ls")]
    List {
        /// Node name
        node: String,
    },

    /// Show the current status of a virtual machine
    Status(GuestRef),

    /// Change the power state of a virtual machine
    Action(GuestActionArgs),

    /// Destroy a virtual machine
    #[command(alias = "rm")]
    Delete(GuestRef),

    /// List snapshots of a virtual machine
    Snapshots(GuestRef),
}

#[derive(Debug, Args)]
pub struct ContainerArgs {
    #[command(subcommand)]
    pub command: CtsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CtsCommand {
    /// List containers on a node
    #[command(alias = "ls")]
    List {
        /// Node name
        node: String,
    },

    /// Show the current status of a container
    Status(GuestRef),

    /// Change the power state of a container
    Action(GuestActionArgs),

    /// Destroy a container
    #[command(alias = "rm")]
    Delete(GuestRef),
}

#[derive(Debug, Args)]
pub struct GuestRef {
    /// Node name
    pub node: String,

    /// Guest id
    pub vmid: u32,
}

#[derive(Debug, Args)]
pub struct GuestActionArgs {
    /// Node name
    pub node: String,

    /// Guest id
    pub vmid: u32,

    /// start, stop, shutdown, reset, resume or suspend
    #[arg(value_parser = parse_action)]
    pub action: GuestAction,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STORAGE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StorageArgs {
    #[command(subcommand)]
    pub command: StorageCommand,
}

#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// List storages visible on a node
    #[command(alias = "ls")]
    List {
        /// Node name
        node: String,
    },

    /// List volumes on a storage
    Content {
        /// Node name
        node: String,

        /// Storage id
        storage: String,

        /// Only show entries of this content kind (backup, iso, images, ...)
        #[arg(long, short = 'c')]
        content: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TASKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Debug, Subcommand)]
pub enum TasksCommand {
    /// List recent tasks of a node
    #[command(alias = "ls")]
    List {
        /// Node name
        node: String,

        /// Max results
        #[arg(long, short = 'l', default_value = "50")]
        limit: u32,

        /// Pagination offset
        #[arg(long, default_value = "0")]
        start: u32,

        /// Only tasks acting on this guest
        #[arg(long)]
        vmid: Option<u32>,

        /// Only failed tasks
        #[arg(long)]
        errors: bool,
    },

    /// Show the status of a task
    Status {
        /// Node name
        node: String,

        /// Task UPID
        upid: String,
    },

    /// Stop a running task
    Stop {
        /// Node name
        node: String,

        /// Task UPID
        upid: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLUSTER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClusterArgs {
    #[command(subcommand)]
    pub command: ClusterCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClusterCommand {
    /// Cluster membership and quorum
    Status,

    /// Every guest, node and storage the cluster knows about
    Resources {
        /// Only resources of this class (vm, storage, node, sdn)
        #[arg(long = "type", short = 't', value_parser = parse_resource_type)]
        resource_type: Option<ResourceType>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users of every realm
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_action(raw: &str) -> Result<GuestAction, String> {
    GuestAction::parse(raw).map_err(|e| e.to_string())
}

fn parse_timeframe(raw: &str) -> Result<Timeframe, String> {
    raw.parse()
        .map_err(|_| format!("unknown timeframe `{raw}` (expected hour, day, week, month or year)"))
}

fn parse_resource_type(raw: &str) -> Result<ResourceType, String> {
    raw.parse()
        .map_err(|_| format!("unknown resource type `{raw}` (expected vm, storage, node or sdn)"))
}
