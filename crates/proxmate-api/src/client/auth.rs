// Ticket authentication.
//
// `POST /access/ticket` exchanges username/password/realm for a ticket
// (sent back as the `PVEAuthCookie` cookie) and a CSRF prevention token.
// Nothing here retries: a failed login is reported as-is.

use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Access, PveClient};
use crate::auth::{ConnectionTarget, Credentials, Session};
use crate::envelope;
use crate::error::Error;
use crate::store::CredentialStore;
use crate::transport::TransportConfig;

#[derive(Deserialize)]
struct TicketData {
    #[serde(default)]
    ticket: Option<String>,
    #[serde(rename = "CSRFPreventionToken", default)]
    csrf_token: Option<String>,
    #[serde(default)]
    username: Option<String>,
    /// Present when the account requires a second factor.
    #[serde(rename = "NeedTFA", default)]
    need_tfa: Option<serde_json::Value>,
}

impl PveClient {
    /// Obtain a session for `credentials` without changing this client.
    ///
    /// The request always goes out without session headers, even if this
    /// client already carries a session.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, Error> {
        credentials.validate()?;

        let url = self.endpoint(&["access", "ticket"]);
        let label = format!("POST {}", url.path());
        let body = json!({
            "username": credentials.username.trim(),
            "password": credentials.password.expose_secret(),
            "realm": credentials.realm,
        });

        debug!(username = %credentials.username, realm = %credentials.realm, "requesting ticket");

        let anonymous;
        let client = if self.session.is_some() {
            anonymous = self.logout()?;
            &anonymous
        } else {
            self
        };

        let text = client
            .send(Method::POST, url, &[], Some(&body), Access::Public)
            .await?;
        let data: TicketData = envelope::decode_object(&label, &text)?;

        if data.need_tfa.is_some_and(|v| !v.is_null()) {
            return Err(Error::InvalidResponse {
                endpoint: label,
                message: "account requires two-factor authentication, which is not supported"
                    .into(),
            });
        }

        let ticket = data.ticket.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
            Error::InvalidResponse {
                endpoint: label.clone(),
                message: "server returned an empty ticket".into(),
            }
        })?;
        let csrf = data
            .csrf_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::InvalidResponse {
                endpoint: label.clone(),
                message: "server returned no CSRF prevention token".into(),
            })?;
        let username = data
            .username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| credentials.userid());

        debug!(%username, "ticket acquired");
        Ok(Session::new(ticket, csrf, username))
    }

    /// Authenticate and return a new client carrying the session.
    pub async fn login(&self, credentials: &Credentials) -> Result<Self, Error> {
        let session = self.authenticate(credentials).await?;
        Self::with_session(self.target.clone(), self.transport.clone(), session)
    }

    /// A session-less client for the same target.
    ///
    /// PVE has no logout endpoint; the ticket simply expires server-side.
    pub fn logout(&self) -> Result<Self, Error> {
        Self::with_transport(self.target.clone(), self.transport.clone())
    }
}

/// One-shot login against `target` with its default transport.
pub async fn authenticate(
    target: &ConnectionTarget,
    credentials: &Credentials,
) -> Result<Session, Error> {
    credentials.validate()?;
    PveClient::new(target.clone())?.authenticate(credentials).await
}

/// Load credentials from `store`, log in, and return the authenticated client.
pub async fn establish_session(
    target: ConnectionTarget,
    transport: TransportConfig,
    store: &dyn CredentialStore,
) -> Result<PveClient, Error> {
    let credentials = store
        .load()
        .map_err(Error::CredentialStore)?
        .ok_or_else(|| Error::invalid_input("credentials", "no stored credentials"))?;

    PveClient::with_transport(target, transport)?
        .login(&credentials)
        .await
}
