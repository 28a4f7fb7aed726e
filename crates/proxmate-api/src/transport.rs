// HTTP transport factory.
//
// Every client value owns one `reqwest::Client` built here. The session
// cookie and anti-forgery header are baked into the default headers, so a
// new session means a new transport; nothing is mutated after build.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use tracing::warn;

use crate::auth::{ConnectionTarget, Session};
use crate::error::Error;

/// Value of the `User-Agent` header on every request.
pub const CLIENT_ID: &str = concat!("proxmate/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Certificate trust policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the platform / bundled root store.
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate and any hostname.
    DangerAcceptInvalid,
}

impl TlsMode {
    pub fn accepts_invalid_certs(&self) -> bool {
        matches!(self, Self::DangerAcceptInvalid)
    }

    pub fn accepts_invalid_hostnames(&self) -> bool {
        matches!(self, Self::DangerAcceptInvalid)
    }
}

/// Transport settings shared by every client built for one target.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Derive the trust policy from the target's `verify_tls` flag.
    pub fn for_target(target: &ConnectionTarget) -> Self {
        let tls = if target.verify_tls {
            TlsMode::System
        } else {
            TlsMode::DangerAcceptInvalid
        };
        Self {
            tls,
            ..Self::default()
        }
    }

    /// Trust a private CA in addition to the system roots.
    ///
    /// Has no effect when invalid certificates are already accepted.
    pub fn with_custom_ca(mut self, path: impl Into<PathBuf>) -> Self {
        if !self.tls.accepts_invalid_certs() {
            self.tls = TlsMode::CustomCa(path.into());
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = timeout;
        self
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.tls.accepts_invalid_certs()
    }

    pub fn accepts_invalid_hostnames(&self) -> bool {
        self.tls.accepts_invalid_hostnames()
    }

    /// Build a `reqwest::Client`, attaching the session headers when given.
    pub fn build_client(&self, session: Option<&Session>) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(CLIENT_ID)
            .default_headers(default_headers(session)?);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!("failed to read CA cert {}: {e}", path.display()))
                })?;
                let cert = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                warn!("TLS verification disabled: accepting any certificate and hostname");
                // Under rustls this also turns off hostname verification.
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn default_headers(session: Option<&Session>) -> Result<HeaderMap, Error> {
    let json = HeaderValue::from_static("application/json");
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, json.clone());
    headers.insert(CONTENT_TYPE, json);

    if let Some(session) = session {
        let mut cookie = HeaderValue::from_str(&session.cookie_value())
            .map_err(|_| Error::Tls("session ticket is not a valid header value".into()))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);

        let mut token = HeaderValue::from_str(session.anti_forgery_token().expose_secret())
            .map_err(|_| Error::Tls("anti-forgery token is not a valid header value".into()))?;
        token.set_sensitive(true);
        headers.insert(HeaderName::from_static("csrfpreventiontoken"), token);
    }

    Ok(headers)
}

/// Only idempotent reads are retried after a failed connect.
pub(crate) fn retries_on_connect_failure(method: &Method) -> bool {
    *method == Method::GET
}
