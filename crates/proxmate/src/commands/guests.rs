//! Virtual machine and container command handlers.

use proxmate_api::PveClient;
use proxmate_api::models::{Container, GuestAction, Snapshot, VirtualMachine};
use tabled::Tabled;

use crate::cli::{ContainerArgs, CtsCommand, GlobalOpts, GuestArgs, GuestRef, VmsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct GuestRow {
    #[tabled(rename = "VMID")]
    vmid: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
}

impl From<&VirtualMachine> for GuestRow {
    fn from(vm: &VirtualMachine) -> Self {
        Self {
            vmid: vm.vmid,
            name: vm.display_name(),
            status: vm.qmpstatus.clone().unwrap_or_else(|| vm.status.clone()),
            cpu: output::percent(vm.cpu),
            memory: output::usage(vm.mem, vm.maxmem),
            uptime: output::uptime(vm.uptime),
        }
    }
}

impl From<&Container> for GuestRow {
    fn from(ct: &Container) -> Self {
        Self {
            vmid: ct.vmid,
            name: ct.display_name(),
            status: ct.status.clone(),
            cpu: output::percent(ct.cpu),
            memory: output::usage(ct.mem, ct.maxmem),
            uptime: output::uptime(ct.uptime),
        }
    }
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Taken")]
    taken: String,
    #[tabled(rename = "RAM")]
    vmstate: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Snapshot> for SnapshotRow {
    fn from(s: &Snapshot) -> Self {
        Self {
            name: s.name.clone(),
            parent: output::opt(s.parent.as_deref()),
            taken: s.snaptime.map_or_else(|| "-".into(), output::timestamp),
            vmstate: if s.vmstate { "yes" } else { "no" }.into(),
            description: s
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_owned(),
        }
    }
}

fn vm_detail(vm: &VirtualMachine) -> Vec<(&'static str, String)> {
    vec![
        ("VMID", vm.vmid.to_string()),
        ("Name", vm.display_name()),
        ("Status", vm.status.clone()),
        ("QMP status", output::opt(vm.qmpstatus.as_deref())),
        ("CPU", format!("{} of {}", output::percent(vm.cpu), vm.cpus)),
        ("Memory", output::usage(vm.mem, vm.maxmem)),
        ("Disk", output::usage(vm.disk, vm.maxdisk)),
        ("Uptime", output::uptime(vm.uptime)),
        ("Tags", output::opt(vm.tags.as_deref())),
        ("Lock", output::opt(vm.lock.as_deref())),
    ]
}

fn container_detail(ct: &Container) -> Vec<(&'static str, String)> {
    vec![
        ("VMID", ct.vmid.to_string()),
        ("Name", ct.display_name()),
        ("Status", ct.status.clone()),
        ("CPU", format!("{} of {}", output::percent(ct.cpu), ct.cpus)),
        ("Memory", output::usage(ct.mem, ct.maxmem)),
        ("Disk", output::usage(ct.disk, ct.maxdisk)),
        ("Uptime", output::uptime(ct.uptime)),
    ]
}

fn action_message(kind: &str, action: GuestAction, guest: &GuestRef) -> String {
    format!("{action} requested for {kind} {} on {}", guest.vmid, guest.node)
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_vms(
    client: &PveClient,
    args: GuestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VmsCommand::List { node } => {
            let vms = client.virtual_machines(&node).await?;
            let out = output::render_list(
                global.output,
                &vms,
                |vm| GuestRow::from(vm),
                |vm| vm.vmid.to_string(),
            )?;
            output::print_output(&out, global.quiet);
        }

        VmsCommand::Status(guest) => {
            let vm = client.vm_status(&guest.node, guest.vmid).await?;
            let out = output::render_single(global.output, &vm, vm_detail, |vm| vm.status.clone())?;
            output::print_output(&out, global.quiet);
        }

        VmsCommand::Action(act) => {
            let guest = GuestRef {
                node: act.node,
                vmid: act.vmid,
            };
            let upid = client.vm_action(&guest.node, guest.vmid, act.action).await?;
            util::print_task(&action_message("VM", act.action, &guest), &upid, global);
        }

        VmsCommand::Delete(guest) => {
            if !util::confirm(
                &format!("Destroy VM {} on {}? This is irreversible.", guest.vmid, guest.node),
                "vms delete",
                global.yes,
            )? {
                return Ok(());
            }
            let upid = client.delete_vm(&guest.node, guest.vmid).await?;
            util::print_task(&format!("Destroying VM {}", guest.vmid), &upid, global);
        }

        VmsCommand::Snapshots(guest) => {
            let snapshots = client.vm_snapshots(&guest.node, guest.vmid).await?;
            let out = output::render_list(
                global.output,
                &snapshots,
                |s| SnapshotRow::from(s),
                |s| s.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

pub async fn handle_cts(
    client: &PveClient,
    args: ContainerArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CtsCommand::List { node } => {
            let cts = client.containers(&node).await?;
            let out = output::render_list(
                global.output,
                &cts,
                |ct| GuestRow::from(ct),
                |ct| ct.vmid.to_string(),
            )?;
            output::print_output(&out, global.quiet);
        }

        CtsCommand::Status(guest) => {
            let ct = client.container_status(&guest.node, guest.vmid).await?;
            let out =
                output::render_single(global.output, &ct, container_detail, |ct| ct.status.clone())?;
            output::print_output(&out, global.quiet);
        }

        CtsCommand::Action(act) => {
            let guest = GuestRef {
                node: act.node,
                vmid: act.vmid,
            };
            let upid = client
                .container_action(&guest.node, guest.vmid, act.action)
                .await?;
            util::print_task(&action_message("container", act.action, &guest), &upid, global);
        }

        CtsCommand::Delete(guest) => {
            if !util::confirm(
                &format!(
                    "Destroy container {} on {}? This is irreversible.",
                    guest.vmid, guest.node
                ),
                "cts delete",
                global.yes,
            )? {
                return Ok(());
            }
            let upid = client.delete_container(&guest.node, guest.vmid).await?;
            util::print_task(&format!("Destroying container {}", guest.vmid), &upid, global);
        }
    }
    Ok(())
}
