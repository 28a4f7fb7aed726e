//! Shared configuration for proxmate.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `proxmate_api` connection types. The CLI adds
//! flag-aware wrappers on top.

mod store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use proxmate_api::{ConnectionTarget, CredentialStore, Credentials, TransportConfig};

pub use store::{KeyringStore, MemoryStore};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "PROXMATE_CONFIG";
/// Environment variable consulted first for the password.
pub const PASSWORD_ENV: &str = "PROXMATE_PASSWORD";
/// Environment variable consulted when a profile has no username.
pub const USERNAME_ENV: &str = "PROXMATE_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in configuration")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("stored credentials are corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named PVE endpoints.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, listing the known names on failure.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profiles.keys().cloned().collect(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_true")]
    pub verify_tls: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            verify_tls: true,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_port() -> u16 {
    proxmate_api::auth::DEFAULT_PORT
}
fn default_realm() -> String {
    proxmate_api::auth::DEFAULT_REALM.into()
}

/// A named PVE endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Hostname or IP address of any cluster node.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub use_https: bool,

    /// Override `defaults.verify_tls`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Authentication realm; unset falls back to stored credentials, then `pam`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,

    /// Plaintext password; prefer the keyring or `PROXMATE_PASSWORD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// PEM file with a private CA to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override `defaults.timeout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            use_https: true,
            verify_tls: None,
            username: None,
            realm: None,
            password: None,
            ca_cert: None,
            timeout: None,
        }
    }

    /// Effective realm, `pam` when none is configured.
    pub fn realm(&self) -> &str {
        self.realm
            .as_deref()
            .unwrap_or(proxmate_api::auth::DEFAULT_REALM)
    }

    pub fn connection_target(&self, defaults: &Defaults) -> ConnectionTarget {
        let target = ConnectionTarget::new(self.host.trim())
            .with_port(self.port)
            .with_https(self.use_https);
        if self.verify_tls.unwrap_or(defaults.verify_tls) {
            target
        } else {
            target.danger_accept_invalid_tls()
        }
    }

    pub fn transport_config(&self, defaults: &Defaults) -> TransportConfig {
        let timeout = Duration::from_secs(self.timeout.unwrap_or(defaults.timeout));
        let mut transport =
            TransportConfig::for_target(&self.connection_target(defaults)).with_timeout(timeout);
        if let Some(ref ca) = self.ca_cert {
            transport = transport.with_custom_ca(ca);
        }
        transport
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `PROXMATE_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "proxmate", "proxmate").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("proxmate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer defaults, the TOML file at `path` (if present) and
/// `PROXMATE_*` environment variables (`__` separates nested keys).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PROXMATE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve login credentials for a profile.
///
/// Username: profile, then `PROXMATE_USERNAME`, then `store`. Password:
/// `PROXMATE_PASSWORD`, then `store`, then the plaintext profile value.
/// Realm: profile, then whatever `store` supplied, then `pam`.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    store: &dyn CredentialStore,
) -> Result<Credentials, ConfigError> {
    resolve_credentials_with(profile, profile_name, store, |key| std::env::var(key).ok())
}

fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    store: &dyn CredentialStore,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, ConfigError> {
    let no_credentials = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };

    let username = profile
        .username
        .clone()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| env(USERNAME_ENV));
    let password = env(PASSWORD_ENV).filter(|p| !p.is_empty());

    // The store is only touched when something is still missing.
    let stored = if username.is_none() || password.is_none() {
        store.load().ok().flatten()
    } else {
        None
    };

    let username = username
        .or_else(|| stored.as_ref().map(|c| c.username.clone()))
        .ok_or_else(no_credentials)?;

    let password = password
        .map(SecretString::from)
        .or_else(|| stored.as_ref().map(|c| c.password.clone()))
        .or_else(|| profile.password.clone().map(SecretString::from))
        .ok_or_else(no_credentials)?;

    let realm = profile
        .realm
        .clone()
        .or_else(|| stored.map(|c| c.realm))
        .unwrap_or_else(default_realm);

    Ok(Credentials {
        username,
        password,
        realm,
    })
}
