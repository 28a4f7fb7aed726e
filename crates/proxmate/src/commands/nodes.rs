//! Node command handlers.

use proxmate_api::PveClient;
use proxmate_api::models::{Node, NodeStatus, RrdDataPoint};
use tabled::Tabled;

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Disk")]
    disk: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            node: n.node.clone(),
            status: n.status.clone(),
            cpu: format!("{} of {}", output::percent(n.cpu), n.maxcpu),
            memory: output::usage(n.mem, n.maxmem),
            disk: output::usage(n.disk, n.maxdisk),
            uptime: output::uptime(n.uptime),
        }
    }
}

#[derive(Tabled)]
struct RrdRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Load")]
    load: String,
    #[tabled(rename = "Mem used")]
    memused: String,
    #[tabled(rename = "Net in")]
    netin: String,
    #[tabled(rename = "Net out")]
    netout: String,
}

impl From<&RrdDataPoint> for RrdRow {
    fn from(p: &RrdDataPoint) -> Self {
        let num = |metric: &str, fmt: fn(f64) -> String| {
            p.value(metric).map_or_else(|| "-".to_owned(), fmt)
        };
        Self {
            time: output::timestamp(i64::try_from(p.time).unwrap_or(i64::MAX)),
            cpu: num("cpu", output::percent),
            load: num("loadavg", |v| format!("{v:.2}")),
            memused: num("memused", bytes_f64),
            netin: num("netin", |v| format!("{}/s", bytes_f64(v))),
            netout: num("netout", |v| format!("{}/s", bytes_f64(v))),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn bytes_f64(v: f64) -> String {
    output::bytes(v.max(0.0) as u64)
}

fn status_detail(s: &NodeStatus) -> Vec<(&'static str, String)> {
    let load = s
        .loadavg
        .iter()
        .map(|l| format!("{l:.2}"))
        .collect::<Vec<_>>()
        .join(" ");
    vec![
        ("CPU", output::percent(s.cpu)),
        ("Idle", output::percent(s.idle)),
        ("Load", load),
        ("Cores", format!("{} ({} sockets)", s.cores, s.sockets)),
        ("MHz", output::opt(s.mhz.as_deref())),
        ("Uptime", output::uptime(s.uptime)),
        ("Kernel", output::opt(s.kversion.as_deref())),
        ("PVE", output::opt(s.pveversion.as_deref())),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &PveClient,
    args: NodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        NodesCommand::List => {
            let nodes = client.nodes().await?;
            output::render_list(global.output, &nodes, |n| NodeRow::from(n), |n| n.node.clone())?
        }

        NodesCommand::Status { node } => {
            let status = client.node_status(&node).await?;
            output::render_single(global.output, &status, status_detail, |s| {
                output::opt(s.pveversion.as_deref())
            })?
        }

        NodesCommand::Rrd { node, window } => {
            let points = client.node_rrd(&node, window.timeframe).await?;
            output::render_list(global.output, &points, |p| RrdRow::from(p), |p| p.time.to_string())?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
