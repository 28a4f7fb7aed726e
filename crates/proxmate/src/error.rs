//! CLI error types with miette diagnostics.
//!
//! Maps `proxmate_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use proxmate_api::Error as PveError;
use proxmate_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach {endpoint}")]
    #[diagnostic(
        code(proxmate::connection_failed),
        help(
            "Check that the host is up and the API port (default 8006) is reachable.\n\
             Use --no-https if the endpoint does not speak TLS."
        )
    )]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(proxmate::tls_error),
        help(
            "PVE ships a self-signed certificate by default.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    #[error("Request timed out ({endpoint})")]
    #[diagnostic(
        code(proxmate::timeout),
        help("Increase the timeout with --timeout or check the node's load.")
    )]
    Timeout { endpoint: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(proxmate::auth_failed),
        help(
            "Verify username, realm and password.\n\
             Store fresh credentials with: proxmate login"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(proxmate::no_credentials),
        help(
            "Run: proxmate login --profile {profile}\n\
             Or set PROXMATE_USERNAME and PROXMATE_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(proxmate::forbidden),
        help("The user lacks the privilege for this path; check its ACLs.")
    )]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Not found: {message}")]
    #[diagnostic(code(proxmate::not_found))]
    NotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(proxmate::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(proxmate::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(proxmate::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: proxmate login --host <HOST> --profile {name} --save-profile"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No PVE host configured")]
    #[diagnostic(
        code(proxmate::no_config),
        help(
            "Pass --host, or add a profile to the config file.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(proxmate::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(proxmate::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(proxmate::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── proxmate_api::Error → CliError mapping ───────────────────────────

impl From<PveError> for CliError {
    fn from(err: PveError) -> Self {
        let message = err.to_string();
        match err {
            PveError::InvalidInput { field, reason } => CliError::Validation {
                field: field.into(),
                reason,
            },

            PveError::Unauthenticated { .. } | PveError::InvalidCredentials { .. } => {
                CliError::AuthFailed { message }
            }

            PveError::Forbidden { .. } => CliError::PermissionDenied { message },

            PveError::NotFound { .. } => CliError::NotFound { message },

            PveError::Tls(message) => CliError::TlsError { message },

            PveError::Network { endpoint, source } => {
                if source.is_timeout() {
                    CliError::Timeout { endpoint }
                } else {
                    CliError::ConnectionFailed {
                        endpoint,
                        source: Box::new(source),
                    }
                }
            }

            _ => CliError::ApiError { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: available.join(", "),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let cases = [
            (
                PveError::InvalidCredentials {
                    endpoint: "POST /api2/json/access/ticket".into(),
                    message: None,
                },
                exit_code::AUTH,
            ),
            (
                PveError::Forbidden {
                    endpoint: "GET /api2/json/nodes".into(),
                    message: Some("Permission check failed".into()),
                },
                exit_code::PERMISSION,
            ),
            (
                PveError::NotFound {
                    endpoint: "GET /api2/json/nodes/pve/qemu/999/status/current".into(),
                    message: None,
                },
                exit_code::NOT_FOUND,
            ),
            (
                PveError::ServerError {
                    endpoint: "GET /api2/json/nodes".into(),
                    message: None,
                },
                exit_code::GENERAL,
            ),
            (
                PveError::Unauthenticated {
                    endpoint: "GET /api2/json/nodes".into(),
                },
                exit_code::AUTH,
            ),
            (PveError::Tls("bad CA".into()), exit_code::CONNECTION),
        ];

        for (err, code) in cases {
            let label = err.to_string();
            assert_eq!(CliError::from(err).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn config_errors_keep_their_meaning() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "prod".into(),
            available: vec!["lab".into(), "home".into()],
        });
        let CliError::ProfileNotFound { available, .. } = &err else {
            panic!("expected ProfileNotFound, got {err:?}");
        };
        assert_eq!(available, "lab, home");

        let err = CliError::from(ConfigError::NoCredentials {
            profile: "lab".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
