// QEMU virtual machines and LXC containers.
//
// Both namespaces share path shapes (`nodes/{node}/{qemu|lxc}/{vmid}/...`),
// so the kind-generic helpers at the bottom do the work and the public
// methods stay thin.

use url::Url;

use super::nodes::rrd_params;
use super::{Access, PveClient, require_non_blank, require_vmid, to_body};
use crate::error::Error;
use crate::models::{
    Container, ContainerCreateRequest, GuestAction, GuestKind, RrdDataPoint, Snapshot,
    SnapshotCreateRequest, Timeframe, Upid, VirtualMachine, VmCreateRequest, VncTicket,
};

impl PveClient {
    // ── Virtual machines ─────────────────────────────────────────────

    /// `GET /nodes/{node}/qemu`
    pub async fn virtual_machines(&self, node: &str) -> Result<Vec<VirtualMachine>, Error> {
        let url = self.guest_root(GuestKind::Qemu, node)?;
        self.get_list(url, &[]).await
    }

    /// `GET /nodes/{node}/qemu/{vmid}/status/current`
    pub async fn vm_status(&self, node: &str, vmid: u32) -> Result<VirtualMachine, Error> {
        let url = self.guest_url(GuestKind::Qemu, node, vmid, &["status", "current"])?;
        self.get_object(url, &[], Access::Authenticated).await
    }

    /// `POST /nodes/{node}/qemu`
    pub async fn create_vm(&self, node: &str, request: &VmCreateRequest) -> Result<Upid, Error> {
        require_vmid(request.vmid)?;
        require_non_blank("name", &request.name)?;
        let url = self.guest_root(GuestKind::Qemu, node)?;
        let body = to_body("request", request)?;
        self.post_task(url, Some(&body)).await
    }

    /// `POST /nodes/{node}/qemu/{vmid}/status/{action}`
    pub async fn vm_action(
        &self,
        node: &str,
        vmid: u32,
        action: GuestAction,
    ) -> Result<Upid, Error> {
        self.guest_action(GuestKind::Qemu, node, vmid, action).await
    }

    /// `DELETE /nodes/{node}/qemu/{vmid}`
    pub async fn delete_vm(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        let url = self.guest_url(GuestKind::Qemu, node, vmid, &[])?;
        self.delete_task(url).await
    }

    /// `GET /nodes/{node}/qemu/{vmid}/rrddata`
    pub async fn vm_rrd(
        &self,
        node: &str,
        vmid: u32,
        timeframe: Timeframe,
    ) -> Result<Vec<RrdDataPoint>, Error> {
        self.guest_rrd(GuestKind::Qemu, node, vmid, timeframe).await
    }

    // ── Containers ───────────────────────────────────────────────────

    /// `GET /nodes/{node}/lxc`
    pub async fn containers(&self, node: &str) -> Result<Vec<Container>, Error> {
        let url = self.guest_root(GuestKind::Lxc, node)?;
        self.get_list(url, &[]).await
    }

    /// `GET /nodes/{node}/lxc/{vmid}/status/current`
    pub async fn container_status(&self, node: &str, vmid: u32) -> Result<Container, Error> {
        let url = self.guest_url(GuestKind::Lxc, node, vmid, &["status", "current"])?;
        self.get_object(url, &[], Access::Authenticated).await
    }

    /// `POST /nodes/{node}/lxc`
    pub async fn create_container(
        &self,
        node: &str,
        request: &ContainerCreateRequest,
    ) -> Result<Upid, Error> {
        require_vmid(request.vmid)?;
        require_non_blank("hostname", &request.hostname)?;
        require_non_blank("ostemplate", &request.ostemplate)?;
        let url = self.guest_root(GuestKind::Lxc, node)?;
        let body = to_body("request", request)?;
        self.post_task(url, Some(&body)).await
    }

    /// `POST /nodes/{node}/lxc/{vmid}/status/{action}`
    ///
    /// `reset` does not exist for containers and is rejected locally.
    pub async fn container_action(
        &self,
        node: &str,
        vmid: u32,
        action: GuestAction,
    ) -> Result<Upid, Error> {
        self.guest_action(GuestKind::Lxc, node, vmid, action).await
    }

    /// `DELETE /nodes/{node}/lxc/{vmid}`
    pub async fn delete_container(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        let url = self.guest_url(GuestKind::Lxc, node, vmid, &[])?;
        self.delete_task(url).await
    }

    /// `GET /nodes/{node}/lxc/{vmid}/rrddata`
    pub async fn container_rrd(
        &self,
        node: &str,
        vmid: u32,
        timeframe: Timeframe,
    ) -> Result<Vec<RrdDataPoint>, Error> {
        self.guest_rrd(GuestKind::Lxc, node, vmid, timeframe).await
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// `GET /nodes/{node}/qemu/{vmid}/snapshot`
    pub async fn vm_snapshots(&self, node: &str, vmid: u32) -> Result<Vec<Snapshot>, Error> {
        let url = self.guest_url(GuestKind::Qemu, node, vmid, &["snapshot"])?;
        self.get_list(url, &[]).await
    }

    /// `POST /nodes/{node}/qemu/{vmid}/snapshot`
    pub async fn create_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        request: &SnapshotCreateRequest,
    ) -> Result<Upid, Error> {
        require_non_blank("snapname", &request.snapname)?;
        let url = self.guest_url(GuestKind::Qemu, node, vmid, &["snapshot"])?;
        let body = to_body("request", request)?;
        self.post_task(url, Some(&body)).await
    }

    /// `DELETE /nodes/{node}/qemu/{vmid}/snapshot/{name}`
    pub async fn delete_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        name: &str,
    ) -> Result<Upid, Error> {
        let name = require_non_blank("snapname", name)?;
        let url = self.guest_url(GuestKind::Qemu, node, vmid, &["snapshot", name])?;
        self.delete_task(url).await
    }

    // ── Console ──────────────────────────────────────────────────────

    /// Ask the server for a one-time VNC ticket.
    ///
    /// `POST /nodes/{node}/{qemu|lxc}/{vmid}/vncproxy`
    pub async fn vnc_proxy(
        &self,
        kind: GuestKind,
        node: &str,
        vmid: u32,
    ) -> Result<VncTicket, Error> {
        let url = self.guest_url(kind, node, vmid, &["vncproxy"])?;
        let body = serde_json::json!({ "websocket": 1 });
        self.post_object(url, Some(&body)).await
    }

    /// WebSocket URL for a ticket from [`vnc_proxy`](Self::vnc_proxy).
    ///
    /// Builds the URL only; streaming the console is up to the caller.
    pub fn vnc_websocket_url(
        &self,
        kind: GuestKind,
        node: &str,
        vmid: u32,
        ticket: &VncTicket,
    ) -> Result<Url, Error> {
        let mut url = self.guest_url(kind, node, vmid, &["vncwebsocket"])?;
        let scheme = if self.target.use_https { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| Error::invalid_input("host", "cannot build a websocket URL"))?;
        url.query_pairs_mut()
            .append_pair("port", &ticket.port.to_string())
            .append_pair("vncticket", &ticket.ticket);
        Ok(url)
    }

    // ── Shared ───────────────────────────────────────────────────────

    fn guest_root(&self, kind: GuestKind, node: &str) -> Result<Url, Error> {
        let node = require_non_blank("node", node)?;
        Ok(self.endpoint(&["nodes", node, kind.as_ref()]))
    }

    fn guest_url(
        &self,
        kind: GuestKind,
        node: &str,
        vmid: u32,
        rest: &[&str],
    ) -> Result<Url, Error> {
        let node = require_non_blank("node", node)?;
        let vmid = require_vmid(vmid)?;
        let mut segments = vec!["nodes", node, kind.as_ref(), vmid.as_str()];
        segments.extend_from_slice(rest);
        Ok(self.endpoint(&segments))
    }

    async fn guest_action(
        &self,
        kind: GuestKind,
        node: &str,
        vmid: u32,
        action: GuestAction,
    ) -> Result<Upid, Error> {
        if !action.supported_by(kind) {
            return Err(Error::invalid_input(
                "action",
                format!("`{action}` is not supported for {kind} guests"),
            ));
        }
        let url = self.guest_url(kind, node, vmid, &["status", action.as_ref()])?;
        self.post_task(url, None).await
    }

    async fn guest_rrd(
        &self,
        kind: GuestKind,
        node: &str,
        vmid: u32,
        timeframe: Timeframe,
    ) -> Result<Vec<RrdDataPoint>, Error> {
        let url = self.guest_url(kind, node, vmid, &["rrddata"])?;
        self.get_list(url, &rrd_params(timeframe)).await
    }
}
