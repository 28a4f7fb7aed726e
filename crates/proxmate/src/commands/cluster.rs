//! Cluster command handlers.

use proxmate_api::PveClient;
use proxmate_api::models::{ClusterResource, ClusterStatusEntry};
use tabled::Tabled;

use crate::cli::{ClusterArgs, ClusterCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&ClusterStatusEntry> for StatusRow {
    fn from(entry: &ClusterStatusEntry) -> Self {
        match entry {
            ClusterStatusEntry::Cluster(c) => Self {
                kind: "cluster".into(),
                name: c.name.clone(),
                address: "-".into(),
                state: format!(
                    "{} nodes, {}",
                    c.nodes,
                    if c.quorate { "quorate" } else { "NOT quorate" }
                ),
            },
            ClusterStatusEntry::Node(n) => Self {
                kind: "node".into(),
                name: n.name.clone(),
                address: output::opt(n.ip.as_deref()),
                state: if n.online { "online" } else { "offline" }.into(),
            },
            ClusterStatusEntry::Unknown => Self {
                kind: "unknown".into(),
                name: "-".into(),
                address: "-".into(),
                state: "-".into(),
            },
        }
    }
}

fn status_id(entry: &ClusterStatusEntry) -> String {
    match entry {
        ClusterStatusEntry::Cluster(c) => c.name.clone(),
        ClusterStatusEntry::Node(n) => n.name.clone(),
        ClusterStatusEntry::Unknown => String::new(),
    }
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Memory")]
    memory: String,
}

impl From<&ClusterResource> for ResourceRow {
    fn from(r: &ClusterResource) -> Self {
        let memory = match (r.mem, r.maxmem) {
            (Some(used), Some(total)) => output::usage(used, total),
            _ => "-".into(),
        };
        Self {
            id: r.id.clone(),
            kind: r.resource_type.clone(),
            node: output::opt(r.node.as_deref()),
            name: r
                .name
                .clone()
                .or_else(|| r.storage.clone())
                .unwrap_or_else(|| "-".into()),
            status: output::opt(r.status.as_deref()),
            memory,
        }
    }
}

pub async fn handle(
    client: &PveClient,
    args: ClusterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        ClusterCommand::Status => {
            let entries = client.cluster_status().await?;
            output::render_list(global.output, &entries, |e| StatusRow::from(e), status_id)?
        }

        ClusterCommand::Resources { resource_type } => {
            let resources = client.cluster_resources(resource_type).await?;
            output::render_list(
                global.output,
                &resources,
                |r| ResourceRow::from(r),
                |r| r.id.clone(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
