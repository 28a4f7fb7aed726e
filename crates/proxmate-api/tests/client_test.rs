#![allow(clippy::unwrap_used)]
// Integration tests for `PveClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use proxmate_api::models::{
    BackupCreateRequest, ClusterStatusEntry, GuestAction, GuestKind, ResourceType, TaskQuery,
    Timeframe, Upid, UserCreateRequest, UserUpdateRequest, VmCreateRequest,
};
use proxmate_api::{
    ConnectionTarget, Credentials, CredentialStore, Error, PveClient, Session, StoreError,
    TransportConfig, cancellable, establish_session,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn target_for(server: &MockServer) -> ConnectionTarget {
    ConnectionTarget::new("127.0.0.1")
        .with_port(server.address().port())
        .with_https(false)
}

async fn setup() -> (MockServer, PveClient) {
    let server = MockServer::start().await;
    let client = PveClient::new(target_for(&server)).unwrap();
    (server, client)
}

async fn setup_authenticated() -> (MockServer, PveClient) {
    let server = MockServer::start().await;
    let target = target_for(&server);
    let transport = TransportConfig::for_target(&target);
    let session = Session::new("ABCDEF", "XYZ", "root@pam");
    let client = PveClient::with_session(target, transport, session).unwrap();
    (server, client)
}

fn api(suffix: &str) -> String {
    format!("/api2/json/{suffix}")
}

fn ticket_body(ticket: &str, csrf: &str) -> serde_json::Value {
    json!({
        "data": {
            "ticket": ticket,
            "CSRFPreventionToken": csrf,
            "username": "root@pam",
            "cap": {}
        }
    })
}

const UPID: &str = "UPID:pve:000A1B2C:0012D687:65A1B2C3:qmstop:100:root@pam:";

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_session_and_authenticated_client() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api("access/ticket")))
        .and(body_json(json!({
            "username": "root",
            "password": "secret",
            "realm": "pam"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_body("ABCDEF", "XYZ")))
        .expect(1)
        .mount(&server)
        .await;

    let logged_in = client
        .login(&Credentials::new("root", "secret"))
        .await
        .unwrap();

    let session = logged_in.session().unwrap();
    assert_eq!(session.username(), "root@pam");
    assert_eq!(
        secrecy::ExposeSecret::expose_secret(session.auth_ticket()),
        "ABCDEF"
    );
    assert_eq!(
        secrecy::ExposeSecret::expose_secret(session.anti_forgery_token()),
        "XYZ"
    );
    assert!(!client.is_authenticated(), "original client must stay session-less");
}

#[tokio::test]
async fn login_sends_no_session_headers() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path(api("access/ticket")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_body("NEW", "TOKEN")))
        .mount(&server)
        .await;

    client
        .authenticate(&Credentials::new("root", "secret"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("cookie"));
    assert!(!requests[0].headers.contains_key("csrfpreventiontoken"));
}

#[tokio::test]
async fn empty_ticket_is_invalid_response() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api("access/ticket")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_body("", "XYZ")))
        .mount(&server)
        .await;

    let result = client.authenticate(&Credentials::new("root", "secret")).await;
    assert!(
        matches!(result, Err(Error::InvalidResponse { .. })),
        "expected InvalidResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn missing_csrf_token_is_invalid_response() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api("access/ticket")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "ticket": "ABCDEF" } })),
        )
        .mount(&server)
        .await;

    let result = client.authenticate(&Credentials::new("root", "secret")).await;
    assert!(matches!(result, Err(Error::InvalidResponse { .. })));
}

#[tokio::test]
async fn blank_credentials_never_reach_the_server() {
    let (server, client) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let blank_user = client.authenticate(&Credentials::new("  ", "secret")).await;
    assert!(matches!(
        blank_user,
        Err(Error::InvalidInput { field: "username", .. })
    ));

    let blank_password = client.authenticate(&Credentials::new("root", "")).await;
    assert!(matches!(
        blank_password,
        Err(Error::InvalidInput { field: "password", .. })
    ));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_host_is_rejected_locally() {
    let result = proxmate_api::authenticate(
        &ConnectionTarget::new(""),
        &Credentials::new("root", "secret"),
    )
    .await;
    assert!(matches!(
        result,
        Err(Error::InvalidInput { field: "host", .. })
    ));
}

#[tokio::test]
async fn login_failure_carries_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(api("access/ticket")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "data": null, "message": "authentication failure" })),
        )
        .mount(&server)
        .await;

    let err = client
        .authenticate(&Credentials::new("root", "wrong"))
        .await
        .unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message(), Some("authentication failure"));
}

#[tokio::test]
async fn logout_drops_the_session() {
    let (server, client) = setup_authenticated().await;

    let anonymous = client.logout().unwrap();
    assert!(!anonymous.is_authenticated());
    assert!(client.is_authenticated());

    let result = anonymous.nodes().await;
    assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Status classification ───────────────────────────────────────────

fn assert_classified(code: u16, err: &Error, operation: &str) {
    let ok = match code {
        401 => matches!(err, Error::InvalidCredentials { .. }),
        403 => matches!(err, Error::Forbidden { .. }),
        404 => matches!(err, Error::NotFound { .. }),
        500 => matches!(err, Error::ServerError { .. }),
        other => matches!(err, Error::UnexpectedStatus { status, .. } if *status == other),
    };
    assert!(ok, "{operation}: HTTP {code} classified as {err:?}");
}

#[tokio::test]
async fn status_mapping_is_identical_across_operations() {
    for code in [401_u16, 403, 404, 500, 418, 502] {
        let (server, client) = setup_authenticated().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(code))
            .mount(&server)
            .await;

        let login = client
            .authenticate(&Credentials::new("root", "secret"))
            .await
            .unwrap_err();
        assert_classified(code, &login, "login");

        let list = client.virtual_machines("pve").await.unwrap_err();
        assert_classified(code, &list, "list");

        let action = client
            .vm_action("pve", 100, GuestAction::Stop)
            .await
            .unwrap_err();
        assert_classified(code, &action, "action");

        let delete = client.delete_vm("pve", 100).await.unwrap_err();
        assert_classified(code, &delete, "delete");
    }
}

#[tokio::test]
async fn action_with_expired_ticket_is_invalid_credentials() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path(api("nodes/pve/qemu/100/status/stop")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .vm_action("pve", 100, GuestAction::Stop)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials { .. }), "{err:?}");
    assert_eq!(
        err.endpoint(),
        Some("POST /api2/json/nodes/pve/qemu/100/status/stop")
    );
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let target = ConnectionTarget::new("127.0.0.1")
        .with_port(port)
        .with_https(false);
    let transport = TransportConfig::for_target(&target);
    let client =
        PveClient::with_session(target, transport, Session::new("A", "B", "root@pam")).unwrap();

    let err = client.nodes().await.unwrap_err();
    assert!(matches!(err, Error::Network { .. }), "{err:?}");
    assert!(err.is_transient());
}

// ── Session gating & headers ────────────────────────────────────────

#[tokio::test]
async fn authenticated_operations_need_a_session() {
    let (server, client) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    assert!(matches!(
        client.nodes().await,
        Err(Error::Unauthenticated { .. })
    ));
    assert!(matches!(
        client.vm_action("pve", 100, GuestAction::Start).await,
        Err(Error::Unauthenticated { .. })
    ));
    assert!(matches!(
        client.delete_user("alice@pve").await,
        Err(Error::Unauthenticated { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn session_headers_are_attached() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/qemu")))
        .and(header("Cookie", "PVEAuthCookie=ABCDEF"))
        .and(header("CSRFPreventionToken", "XYZ"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "vmid": 100, "name": "web01", "status": "running", "cpu": 0.02,
                  "mem": 536_870_912, "maxmem": 2_147_483_648_u64, "uptime": 3600 },
                { "vmid": "101", "name": "db01", "status": "stopped", "template": 0 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vms = client.virtual_machines("pve").await.unwrap();
    assert_eq!(vms.len(), 2);
    assert_eq!(vms[0].vmid, 100);
    assert_eq!(vms[0].name.as_deref(), Some("web01"));
    assert!(vms[0].is_running());
    assert_eq!(vms[1].vmid, 101);
}

#[tokio::test]
async fn user_agent_identifies_client() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(api("version")))
        .and(header("User-Agent", proxmate_api::transport::CLIENT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "version": "8.2.4", "release": "8.2", "repoid": "faa83925" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let version = client.version().await.unwrap();
    assert_eq!(version.version, "8.2.4");
}

// ── Envelope decoding ───────────────────────────────────────────────

#[tokio::test]
async fn null_collection_is_empty() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/lxc")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    assert!(client.containers("pve").await.unwrap().is_empty());
}

#[tokio::test]
async fn null_object_is_malformed() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    let err = client.node_status("pve").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }), "{err:?}");
}

#[tokio::test]
async fn decode_error_names_the_field() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "node": "pve1", "status": "online" }, { "status": "offline" } ]
        })))
        .mount(&server)
        .await;

    match client.nodes().await {
        Err(Error::MalformedResponse { path, .. }) => {
            assert_eq!(path.as_deref(), Some("data[1].node"));
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn nested_type_error_names_the_field() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "memory": { "total": "big", "used": 1, "free": 1 },
                "swap": { "total": 0, "used": 0, "free": 0 },
                "rootfs": { "total": 0, "used": 0, "free": 0, "avail": 0 }
            }
        })))
        .mount(&server)
        .await;

    match client.node_status("pve").await {
        Err(Error::MalformedResponse { path, .. }) => {
            assert_eq!(path.as_deref(), Some("data.memory.total"));
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

// ── Guests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn vm_action_returns_task_id() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path(api("nodes/pve/qemu/100/status/stop")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": UPID })))
        .expect(1)
        .mount(&server)
        .await;

    let upid = client
        .vm_action("pve", 100, GuestAction::Stop)
        .await
        .unwrap();
    assert_eq!(upid.as_str(), UPID);
    assert_eq!(upid.node(), Some("pve"));
}

#[tokio::test]
async fn unknown_action_string_is_rejected() {
    let err = GuestAction::parse("hibernate").unwrap_err();
    assert!(matches!(err, Error::InvalidInput { field: "action", .. }));
}

#[tokio::test]
async fn container_reset_is_rejected_locally() {
    let (server, client) = setup_authenticated().await;

    let err = client
        .container_action("pve", 200, GuestAction::Reset)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { field: "action", .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn zero_vmid_and_blank_node_are_rejected() {
    let (server, client) = setup_authenticated().await;

    assert!(matches!(
        client.vm_status("pve", 0).await,
        Err(Error::InvalidInput { field: "vmid", .. })
    ));
    assert!(matches!(
        client.virtual_machines(" ").await,
        Err(Error::InvalidInput { field: "node", .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_vm_sends_defaults() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path(api("nodes/pve/qemu")))
        .and(body_json(json!({
            "vmid": 200,
            "name": "web02",
            "cores": 1,
            "memory": 512,
            "ostype": "l26",
            "scsi0": "local-lvm:32",
            "net0": "virtio,bridge=vmbr0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": UPID })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_vm("pve", &VmCreateRequest::new(200, "web02"))
        .await
        .unwrap();
}

#[tokio::test]
async fn rrd_defaults_to_hour() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/qemu/100/rrddata")))
        .and(query_param("timeframe", "hour"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "time": 1_700_000_000, "cpu": 0.05, "maxmem": 2048 } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let points = client
        .vm_rrd("pve", 100, Timeframe::default())
        .await
        .unwrap();
    assert_eq!(points[0].value("cpu"), Some(0.05));
}

#[tokio::test]
async fn snapshot_lifecycle_paths() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/qemu/100/snapshot")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "name": "before-upgrade", "snaptime": 1_700_000_000, "vmstate": 0 },
                { "name": "current", "parent": "before-upgrade", "running": 1 }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(api("nodes/pve/qemu/100/snapshot/before-upgrade")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": UPID })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshots = client.vm_snapshots("pve", 100).await.unwrap();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots[1].is_current());

    client
        .delete_vm_snapshot("pve", 100, "before-upgrade")
        .await
        .unwrap();
}

#[tokio::test]
async fn vnc_ticket_and_websocket_url() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path(api("nodes/pve/lxc/200/vncproxy")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "ticket": "PVEVNC:ABC+/=", "port": "5900", "user": "root@pam" }
        })))
        .mount(&server)
        .await;

    let ticket = client.vnc_proxy(GuestKind::Lxc, "pve", 200).await.unwrap();
    let url = client
        .vnc_websocket_url(GuestKind::Lxc, "pve", 200, &ticket)
        .unwrap();

    assert_eq!(url.scheme(), "ws");
    assert_eq!(url.path(), "/api2/json/nodes/pve/lxc/200/vncwebsocket");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("port".to_owned(), "5900".to_owned()),
            ("vncticket".to_owned(), "PVEVNC:ABC+/=".to_owned())
        ]
    );
}

// ── Storage & backups ───────────────────────────────────────────────

#[tokio::test]
async fn volume_ids_are_percent_encoded() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("DELETE"))
        .and(path(api(
            "nodes/pve/storage/local/content/local:backup%2Fvzdump-qemu-100.vma.zst",
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .expect(1)
        .mount(&server)
        .await;

    let upid = client
        .delete_volume("pve", "local", "local:backup/vzdump-qemu-100.vma.zst")
        .await
        .unwrap();
    assert_eq!(upid, None);
}

#[tokio::test]
async fn backup_request_body() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path(api("nodes/pve/qemu/100/backup")))
        .and(body_json(json!({ "storage": "pbs", "mode": "snapshot", "compress": "zstd" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": UPID })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_backup("pve", 100, &BackupCreateRequest::new("pbs"))
        .await
        .unwrap();
}

#[tokio::test]
async fn browse_defaults_to_root() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/storage/local/browse")))
        .and(query_param("path", "/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "filename": "dump", "type": "d" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client.browse_storage("pve", "local", None).await.unwrap();
    assert_eq!(entries[0].name, "dump");
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_user_omits_unset_fields() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("POST"))
        .and(path(api("access/users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    let mut request = UserCreateRequest::new("alice@pve");
    request.password = Some("correct-horse".into());
    request.email = Some("alice@example.com".into());
    client.create_user(&request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        sent,
        json!({
            "userid": "alice@pve",
            "password": "correct-horse",
            "email": "alice@example.com"
        })
    );
    let decoded: UserCreateRequest = serde_json::from_value(sent).unwrap();
    assert_eq!(decoded, request);
}

#[tokio::test]
async fn update_user_uses_put_with_encoded_id() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("PUT"))
        .and(path(api("access/users/alice@pve")))
        .and(body_json(json!({ "comment": "ops team", "enable": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .expect(1)
        .mount(&server)
        .await;

    let update = UserUpdateRequest {
        comment: Some("ops team".into()),
        enable: Some(false),
        ..UserUpdateRequest::default()
    };
    client.update_user("alice@pve", &update).await.unwrap();
}

// ── Tasks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn task_listing_sends_paging_defaults() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes/pve/tasks")))
        .and(query_param("limit", "50"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "upid": UPID, "node": "pve", "type": "qmstop", "id": "100",
                "user": "root@pam", "starttime": 1_700_000_000, "endtime": 1_700_000_005,
                "status": "OK"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client.tasks("pve", TaskQuery::default()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, "qmstop");
    assert!(!tasks[0].is_running());
}

#[tokio::test]
async fn task_status_and_stop() {
    let (server, client) = setup_authenticated().await;
    let upid = Upid::new(UPID);

    Mock::given(method("GET"))
        .and(path(api(&format!("nodes/pve/tasks/{UPID}/status"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "status": "stopped", "exitstatus": "OK", "upid": UPID }
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(api(&format!("nodes/pve/tasks/{UPID}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.task_status("pve", &upid).await.unwrap();
    assert_eq!(status.succeeded(), Some(true));
    client.stop_task("pve", &upid).await.unwrap();
}

// ── Cluster ─────────────────────────────────────────────────────────

#[tokio::test]
async fn cluster_status_and_filtered_resources() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("cluster/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "type": "cluster", "name": "lab", "nodes": 1, "quorate": 1 },
                { "type": "node", "name": "pve", "online": 1, "local": 1, "nodeid": 1 }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("cluster/resources")))
        .and(query_param("type", "vm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "id": "qemu/100", "type": "qemu", "node": "pve", "vmid": 100 } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.cluster_status().await.unwrap();
    assert!(matches!(&status[0], ClusterStatusEntry::Cluster(c) if c.name == "lab"));

    let resources = client
        .cluster_resources(Some(ResourceType::Vm))
        .await
        .unwrap();
    assert_eq!(resources[0].id, "qemu/100");
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn pre_cancelled_token_sends_nothing() {
    let (server, client) = setup_authenticated().await;

    let token = CancellationToken::new();
    token.cancel();
    let outcome = cancellable(&token, client.nodes()).await;
    assert!(outcome.is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancellation_abandons_slow_request() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path(api("nodes")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let outcome = cancellable(&token, client.nodes()).await;
    assert!(outcome.is_none());
    assert!(started.elapsed() < Duration::from_secs(2));
}

// ── Credential store ────────────────────────────────────────────────

struct FixedStore(Option<(&'static str, &'static str)>);

impl CredentialStore for FixedStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.0.map(|(user, pass)| Credentials::new(user, pass)))
    }

    fn save(&self, _credentials: &Credentials) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn establish_session_uses_stored_credentials() {
    let server = MockServer::start().await;
    let target = target_for(&server);

    Mock::given(method("POST"))
        .and(path(api("access/ticket")))
        .and(body_json(json!({ "username": "root", "password": "stored", "realm": "pam" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_body("ABCDEF", "XYZ")))
        .expect(1)
        .mount(&server)
        .await;

    let client = establish_session(
        target.clone(),
        TransportConfig::for_target(&target),
        &FixedStore(Some(("root", "stored"))),
    )
    .await
    .unwrap();
    assert!(client.is_authenticated());

    let empty = establish_session(
        target.clone(),
        TransportConfig::for_target(&target),
        &FixedStore(None),
    )
    .await;
    assert!(matches!(
        empty,
        Err(Error::InvalidInput { field: "credentials", .. })
    ));
}
