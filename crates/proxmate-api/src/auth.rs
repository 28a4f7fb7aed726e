use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Default port of the PVE API daemon.
pub const DEFAULT_PORT: u16 = 8006;

/// Default authentication realm (Linux PAM).
pub const DEFAULT_REALM: &str = "pam";

/// Name of the cookie carrying the session ticket.
pub const AUTH_COOKIE: &str = "PVEAuthCookie";

/// Header carrying the anti-forgery token.
pub const CSRF_HEADER: &str = "CSRFPreventionToken";

// ── ConnectionTarget ────────────────────────────────────────────────

/// One management endpoint.
///
/// A client value is bound to exactly one target; connecting somewhere
/// else means building a new client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub use_https: bool,
    /// When `false` the transport accepts any certificate and any hostname.
    pub verify_tls: bool,
}

impl ConnectionTarget {
    /// HTTPS on the default port with full certificate verification.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            use_https: true,
            verify_tls: true,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_https(mut self, use_https: bool) -> Self {
        self.use_https = use_https;
        self
    }

    /// Opt in to accepting self-signed certificates and mismatched hostnames.
    ///
    /// This disables transport security; only use it against hosts on a
    /// network you trust.
    pub fn danger_accept_invalid_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_https { "https" } else { "http" }
    }

    /// `{scheme}://{host}:{port}/`, with IPv6 literals bracketed.
    pub fn base_url(&self) -> Result<Url, Error> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(Error::invalid_input("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(Error::invalid_input("port", "must be between 1 and 65535"));
        }

        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_owned()
        };

        let raw = format!("{}://{host}:{}/", self.scheme(), self.port);
        Url::parse(&raw).map_err(|e| Error::invalid_input("host", format!("{e} ({raw})")))
    }
}

// ── Credentials ─────────────────────────────────────────────────────

/// Username, password and realm used to obtain a session.
///
/// The password is never printed by `Debug`. Persistence is the job of a
/// [`CredentialStore`](crate::CredentialStore).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub realm: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            realm: DEFAULT_REALM.to_owned(),
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// `user@realm`, the identifier the server uses in ACLs and task logs.
    pub fn userid(&self) -> String {
        if self.username.contains('@') {
            self.username.clone()
        } else {
            format!("{}@{}", self.username, self.realm)
        }
    }

    /// Local precondition check; runs before any network call.
    pub fn validate(&self) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::invalid_input("username", "must not be empty"));
        }
        if self.password.expose_secret().trim().is_empty() {
            return Err(Error::invalid_input("password", "must not be empty"));
        }
        Ok(())
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// Bearer material returned by a successful login.
///
/// Expiry is enforced by the server (tickets live two hours); the client
/// does not track it. A session is never mutated: re-authenticating yields
/// a new `Session` and a new client value.
#[derive(Clone)]
pub struct Session {
    ticket: SecretString,
    csrf_token: SecretString,
    username: String,
    issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        ticket: impl Into<String>,
        csrf_token: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            ticket: SecretString::from(ticket.into()),
            csrf_token: SecretString::from(csrf_token.into()),
            username: username.into(),
            issued_at: Utc::now(),
        }
    }

    /// Override the issue timestamp (restoring a session saved elsewhere).
    pub fn issued(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = at;
        self
    }

    /// The ticket sent as the `PVEAuthCookie` cookie.
    pub fn auth_ticket(&self) -> &SecretString {
        &self.ticket
    }

    /// The token sent as the `CSRFPreventionToken` header.
    pub fn anti_forgery_token(&self) -> &SecretString {
        &self.csrf_token
    }

    /// `user@realm` as echoed by the server.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub(crate) fn cookie_value(&self) -> String {
        format!("{AUTH_COOKIE}={}", self.ticket.expose_secret())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("ticket", &"[REDACTED]")
            .field("csrf_token", &"[REDACTED]")
            .field("username", &self.username)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_uses_scheme_and_port() {
        let target = ConnectionTarget::new("pve.local");
        assert_eq!(
            target.base_url().map(String::from).ok().as_deref(),
            Some("https://pve.local:8006/")
        );

        let plain = ConnectionTarget::new("10.0.0.5").with_https(false).with_port(8080);
        assert_eq!(
            plain.base_url().map(String::from).ok().as_deref(),
            Some("http://10.0.0.5:8080/")
        );
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let target = ConnectionTarget::new("fd00::10");
        assert_eq!(
            target.base_url().map(String::from).ok().as_deref(),
            Some("https://[fd00::10]:8006/")
        );
    }

    #[test]
    fn blank_host_is_rejected() {
        let err = ConnectionTarget::new("   ").base_url();
        assert!(matches!(err, Err(Error::InvalidInput { field: "host", .. })));
    }

    #[test]
    fn verification_is_on_by_default() {
        assert!(ConnectionTarget::new("pve").verify_tls);
        assert!(!ConnectionTarget::new("pve").danger_accept_invalid_tls().verify_tls);
    }

    #[test]
    fn credentials_validation() {
        assert!(Credentials::new("root", "secret").validate().is_ok());
        assert!(matches!(
            Credentials::new("", "secret").validate(),
            Err(Error::InvalidInput { field: "username", .. })
        ));
        assert!(matches!(
            Credentials::new("root", " ").validate(),
            Err(Error::InvalidInput { field: "password", .. })
        ));
    }

    #[test]
    fn userid_appends_realm_once() {
        assert_eq!(Credentials::new("root", "x").userid(), "root@pam");
        assert_eq!(
            Credentials::new("alice", "x").with_realm("pve").userid(),
            "alice@pve"
        );
        assert_eq!(Credentials::new("bob@ldap", "x").userid(), "bob@ldap");
    }

    #[test]
    fn session_debug_redacts_secrets() {
        let session = Session::new("PVE:root@pam:TICKET", "CSRF-TOKEN", "root@pam");
        let debug = format!("{session:?}");
        assert!(!debug.contains("TICKET"));
        assert!(!debug.contains("CSRF-TOKEN"));
        assert!(debug.contains("root@pam"));

        let creds = Credentials::new("root", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
