// PVE API HTTP client
//
// Wraps `reqwest::Client` with URL construction under `api2/json/`, session
// gating, envelope unwrapping and status classification. Endpoint groups
// (nodes, guests, storage, ...) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

mod access;
mod auth;
mod cluster;
mod guests;
mod network;
mod nodes;
mod storage;
mod system;
mod tasks;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{ConnectionTarget, Session};
use crate::envelope;
use crate::error::{Error, classify_status};
use crate::models::Upid;
use crate::transport::{TransportConfig, retries_on_connect_failure};

pub use auth::{authenticate, establish_session};

/// Fixed API prefix below the target's base URL.
const API_PREFIX: [&str; 2] = ["api2", "json"];

/// Whether a request may go out without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Public,
    Authenticated,
}

/// Typed client for one PVE endpoint.
///
/// A value is bound to one [`ConnectionTarget`] and at most one [`Session`]
/// and is never mutated: [`login`](Self::login) and [`logout`](Self::logout)
/// return new values. Cloning is cheap and clones share the connection pool,
/// so one client can serve many concurrent operations.
#[derive(Clone)]
pub struct PveClient {
    http: reqwest::Client,
    api_root: Url,
    target: ConnectionTarget,
    transport: TransportConfig,
    session: Option<Arc<Session>>,
}

impl std::fmt::Debug for PveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PveClient")
            .field("api_root", &self.api_root.as_str())
            .field("tls", &self.transport.tls)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl PveClient {
    /// Session-less client for `target`, with TLS policy from `verify_tls`.
    pub fn new(target: ConnectionTarget) -> Result<Self, Error> {
        let transport = TransportConfig::for_target(&target);
        Self::with_transport(target, transport)
    }

    /// Session-less client with explicit transport settings.
    pub fn with_transport(
        target: ConnectionTarget,
        transport: TransportConfig,
    ) -> Result<Self, Error> {
        Self::build(target, transport, None)
    }

    /// Client that carries an existing session (e.g. restored from disk).
    pub fn with_session(
        target: ConnectionTarget,
        transport: TransportConfig,
        session: Session,
    ) -> Result<Self, Error> {
        Self::build(target, transport, Some(Arc::new(session)))
    }

    fn build(
        target: ConnectionTarget,
        transport: TransportConfig,
        session: Option<Arc<Session>>,
    ) -> Result<Self, Error> {
        let mut api_root = target.base_url()?;
        api_root
            .path_segments_mut()
            .map_err(|()| Error::invalid_input("host", "cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(API_PREFIX);

        let http = transport.build_client(session.as_deref())?;
        Ok(Self {
            http,
            api_root,
            target,
            transport,
            session,
        })
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{api_root}/{segments...}`; every segment is percent-encoded, so ids
    /// containing `/`, `:` or spaces stay a single path component.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
        access: Access,
    ) -> Result<String, Error> {
        let endpoint = Self::label(&method, &url);
        if access == Access::Authenticated && self.session.is_none() {
            return Err(Error::Unauthenticated { endpoint });
        }

        debug!(%method, %url, "sending request");

        let request = || {
            let mut builder = self.http.request(method.clone(), url.clone());
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }
            builder.send()
        };

        let response = match request().await {
            Ok(response) => response,
            Err(e) if e.is_connect() && retries_on_connect_failure(&method) => {
                warn!(%endpoint, error = %e, "connection failed, retrying once");
                request().await.map_err(|source| Error::Network {
                    endpoint: endpoint.clone(),
                    source,
                })?
            }
            Err(source) => return Err(Error::Network { endpoint, source }),
        };

        let status = response.status();
        let text = response.text().await.map_err(|source| Error::Network {
            endpoint: endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            debug!(%endpoint, %status, "request failed");
            return Err(classify_status(status, endpoint, &text));
        }

        Ok(text)
    }

    fn label(method: &Method, url: &Url) -> String {
        format!("{method} {}", url.path())
    }

    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let label = Self::label(&Method::GET, &url);
        let body = self
            .send(Method::GET, url, query, None, Access::Authenticated)
            .await?;
        envelope::decode_list(&label, &body)
    }

    pub(crate) async fn get_object<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        access: Access,
    ) -> Result<T, Error> {
        let label = Self::label(&Method::GET, &url);
        let body = self.send(Method::GET, url, query, None, access).await?;
        envelope::decode_object(&label, &body)
    }

    pub(crate) async fn post_object<T: DeserializeOwned>(
        &self,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let label = Self::label(&Method::POST, &url);
        let text = self
            .send(Method::POST, url, &[], body, Access::Authenticated)
            .await?;
        envelope::decode_object(&label, &text)
    }

    /// POST that starts a background task and returns its id.
    pub(crate) async fn post_task(&self, url: Url, body: Option<&Value>) -> Result<Upid, Error> {
        self.post_object(url, body).await
    }

    pub(crate) async fn post_unit(&self, url: Url, body: Option<&Value>) -> Result<(), Error> {
        self.send(Method::POST, url, &[], body, Access::Authenticated)
            .await
            .map(drop)
    }

    pub(crate) async fn put_unit(&self, url: Url, body: Option<&Value>) -> Result<(), Error> {
        self.send(Method::PUT, url, &[], body, Access::Authenticated)
            .await
            .map(drop)
    }

    pub(crate) async fn delete_task(&self, url: Url) -> Result<Upid, Error> {
        let label = Self::label(&Method::DELETE, &url);
        let text = self
            .send(Method::DELETE, url, &[], None, Access::Authenticated)
            .await?;
        envelope::decode_object(&label, &text)
    }

    pub(crate) async fn delete_optional<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, Error> {
        let label = Self::label(&Method::DELETE, &url);
        let text = self
            .send(Method::DELETE, url, &[], None, Access::Authenticated)
            .await?;
        envelope::decode_optional(&label, &text)
    }

    pub(crate) async fn delete_unit(&self, url: Url) -> Result<(), Error> {
        self.send(Method::DELETE, url, &[], None, Access::Authenticated)
            .await
            .map(drop)
    }
}

// ── Validation ──────────────────────────────────────────────────────

pub(crate) fn require_non_blank<'a>(field: &'static str, value: &'a str) -> Result<&'a str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::invalid_input(field, "must not be empty"))
    } else {
        Ok(trimmed)
    }
}

pub(crate) fn require_vmid(vmid: u32) -> Result<String, Error> {
    if vmid == 0 {
        Err(Error::invalid_input("vmid", "must be a positive integer"))
    } else {
        Ok(vmid.to_string())
    }
}

pub(crate) fn to_body<T: serde::Serialize>(field: &'static str, value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::invalid_input(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PveClient {
        PveClient::new(ConnectionTarget::new("pve.example.com"))
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn endpoint_sits_under_api_prefix() {
        let url = client().endpoint(&["nodes", "pve", "qemu"]);
        assert_eq!(
            url.as_str(),
            "https://pve.example.com:8006/api2/json/nodes/pve/qemu"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        let url = client().endpoint(&[
            "nodes",
            "pve",
            "storage",
            "local",
            "content",
            "local:backup/vzdump-qemu-100.vma.zst",
        ]);
        assert!(url.path().ends_with("/content/local:backup%2Fvzdump-qemu-100.vma.zst"));
    }

    #[test]
    fn validation_helpers() {
        assert!(matches!(require_vmid(0), Err(Error::InvalidInput { field: "vmid", .. })));
        assert_eq!(require_vmid(100).ok().as_deref(), Some("100"));
        assert!(matches!(
            require_non_blank("node", "  "),
            Err(Error::InvalidInput { field: "node", .. })
        ));
        assert_eq!(require_non_blank("node", " pve ").ok(), Some("pve"));
    }

    #[test]
    fn new_client_has_no_session() {
        let client = client();
        assert!(!client.is_authenticated());
        assert!(client.session().is_none());
        assert!(!client.transport().accepts_invalid_certs());
    }
}
