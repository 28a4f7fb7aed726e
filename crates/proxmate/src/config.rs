//! CLI configuration: thin wrapper around `proxmate_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --username, --insecure, ...).

use proxmate_api::{ConnectionTarget, Credentials, TransportConfig};
use proxmate_config::{Config, KeyringStore, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use proxmate_config::{config_path, load_config, save_config};

/// A profile after flag overrides, ready to connect.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub name: String,
    pub profile: Profile,
    pub config: Config,
}

impl ResolvedProfile {
    pub fn target(&self) -> ConnectionTarget {
        self.profile.connection_target(&self.config.defaults)
    }

    pub fn transport(&self) -> TransportConfig {
        self.profile.transport_config(&self.config.defaults)
    }

    pub fn store(&self) -> KeyringStore {
        KeyringStore::new(&self.name)
    }

    /// Credentials from env, keyring or plaintext config, in that order.
    pub fn credentials(&self) -> Result<Credentials, CliError> {
        Ok(proxmate_config::resolve_credentials(
            &self.profile,
            &self.name,
            &self.store(),
        )?)
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load the config file and merge the profile with CLI flag overrides.
///
/// Without a matching profile, `--host` alone is enough to build one.
pub fn resolve(global: &GlobalOpts) -> Result<ResolvedProfile, CliError> {
    let config = load_config()?;
    resolve_with(global, config)
}

pub fn resolve_with(global: &GlobalOpts, config: Config) -> Result<ResolvedProfile, CliError> {
    let name = active_profile_name(global, &config);

    let mut profile = match (config.profiles.get(&name), global.host.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(host)) => Profile::new(host),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: config.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                name,
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);

    if profile.host.trim().is_empty() {
        return Err(CliError::Validation {
            field: "host".into(),
            reason: "must not be blank".into(),
        });
    }

    Ok(ResolvedProfile {
        name,
        profile,
        config,
    })
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if global.no_https {
        profile.use_https = false;
    }
    if global.insecure {
        profile.verify_tls = Some(false);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref realm) = global.realm {
        profile.realm = Some(realm.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}
