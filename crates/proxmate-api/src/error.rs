// Error taxonomy shared by the authenticator and every typed operation.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Top-level error type for the `proxmate-api` crate.
///
/// Every operation returns one of these as a plain `Result` value. Variants
/// that originate on the server carry the endpoint (`METHOD /path`) and the
/// server-provided message when one was present, so callers can render a
/// useful message without inspecting raw HTTP.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local ───────────────────────────────────────────────────────
    /// A precondition failed before any request was sent.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// An authenticated operation was attempted without a session.
    #[error("{endpoint} requires an authenticated session")]
    Unauthenticated { endpoint: String },

    /// The HTTP transport could not be built (CA bundle, header values).
    #[error("TLS/transport setup failed: {0}")]
    Tls(String),

    /// The credential store failed to load, save or clear.
    #[error("credential store error: {0}")]
    CredentialStore(#[source] crate::store::StoreError),

    // ── HTTP status ─────────────────────────────────────────────────
    /// HTTP 401: wrong username/password, or the ticket was rejected.
    #[error("invalid credentials ({endpoint}){}", detail(.message))]
    InvalidCredentials {
        endpoint: String,
        message: Option<String>,
    },

    /// HTTP 403: authenticated but not permitted.
    #[error("access forbidden ({endpoint}){}", detail(.message))]
    Forbidden {
        endpoint: String,
        message: Option<String>,
    },

    /// HTTP 404: the node, guest, storage or path does not exist.
    #[error("not found ({endpoint}){}", detail(.message))]
    NotFound {
        endpoint: String,
        message: Option<String>,
    },

    /// HTTP 500.
    #[error("server error ({endpoint}){}", detail(.message))]
    ServerError {
        endpoint: String,
        message: Option<String>,
    },

    /// Any other non-2xx status.
    #[error("unexpected HTTP {status} ({endpoint}){}", detail(.message))]
    UnexpectedStatus {
        status: u16,
        endpoint: String,
        message: Option<String>,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// DNS, TLS, timeout or connection failure.
    #[error("network error ({endpoint}): {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// The body did not match the expected schema.
    #[error("malformed response ({endpoint}){}: {message}", at_path(.path))]
    MalformedResponse {
        endpoint: String,
        path: Option<String>,
        message: String,
    },

    /// The body decoded but violates the protocol (e.g. a blank ticket).
    #[error("invalid response ({endpoint}): {message}")]
    InvalidResponse { endpoint: String, message: String },
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

fn at_path(path: &Option<String>) -> String {
    path.as_deref()
        .map(|p| format!(" at `{p}`"))
        .unwrap_or_default()
}

impl Error {
    /// The HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidCredentials { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::ServerError { .. } => Some(500),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Network { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The `METHOD /path` the error relates to, when known.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { endpoint }
            | Self::InvalidCredentials { endpoint, .. }
            | Self::Forbidden { endpoint, .. }
            | Self::NotFound { endpoint, .. }
            | Self::ServerError { endpoint, .. }
            | Self::UnexpectedStatus { endpoint, .. }
            | Self::Network { endpoint, .. }
            | Self::MalformedResponse { endpoint, .. }
            | Self::InvalidResponse { endpoint, .. } => Some(endpoint),
            Self::InvalidInput { .. } | Self::Tls(_) | Self::CredentialStore(_) => None,
        }
    }

    /// The message the server attached to a failed response.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::InvalidCredentials { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::ServerError { message, .. }
            | Self::UnexpectedStatus { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` when logging in again may resolve the error.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. } | Self::Unauthenticated { .. }
        )
    }

    /// Returns `true` for failures worth retrying at the caller's discretion.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { source, .. } => source.is_timeout() || source.is_connect(),
            Self::ServerError { .. } => true,
            Self::UnexpectedStatus { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

// ── Status classification ───────────────────────────────────────────

/// PVE error body: `{"data": null, "errors": {"field": "msg"}, "message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, serde_json::Value>>,
}

const MAX_MESSAGE_CHARS: usize = 200;

/// Map a non-success status to the error taxonomy.
///
/// Shared by the authenticator and every typed operation, so the mapping is
/// identical for login, listing, actions and deletes.
pub(crate) fn classify_status(status: StatusCode, endpoint: String, body: &str) -> Error {
    let message = server_message(body);
    match status {
        StatusCode::UNAUTHORIZED => Error::InvalidCredentials { endpoint, message },
        StatusCode::FORBIDDEN => Error::Forbidden { endpoint, message },
        StatusCode::NOT_FOUND => Error::NotFound { endpoint, message },
        StatusCode::INTERNAL_SERVER_ERROR => Error::ServerError { endpoint, message },
        other => Error::UnexpectedStatus {
            status: other.as_u16(),
            endpoint,
            message,
        },
    }
}

/// Extract a human-readable message from an error body.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        let mut parts = Vec::new();
        if let Some(message) = parsed.message.filter(|m| !m.trim().is_empty()) {
            parts.push(message.trim().to_owned());
        }
        for (field, value) in parsed.errors.unwrap_or_default() {
            let text = match value {
                serde_json::Value::String(s) => s.trim().to_owned(),
                other => other.to_string(),
            };
            parts.push(format!("{field}: {text}"));
        }
        return if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        };
    }

    Some(trimmed.chars().take(MAX_MESSAGE_CHARS).collect())
}
