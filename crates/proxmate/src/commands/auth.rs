//! Login, logout and version handlers.
//!
//! PVE has no server-side logout: tickets expire on their own. `login`
//! therefore verifies credentials and persists them in the OS keyring;
//! every later invocation opens its own short session from there.

use proxmate_api::models::VersionInfo;
use proxmate_api::{CredentialStore, Credentials, Error as PveError, PveClient};
use proxmate_config::{KeyringStore, PASSWORD_ENV};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, ResolvedProfile};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Io(std::io::Error::other(e.to_string()))
}

pub async fn login(
    resolved: &ResolvedProfile,
    args: &LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let username = match resolved.profile.username.clone() {
        Some(name) if !name.trim().is_empty() => name,
        _ => dialoguer::Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?,
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => pw,
        _ => rpassword::prompt_password(format!("Password for {username}: "))
            .map_err(prompt_err)?,
    };

    let credentials = Credentials::new(username, password).with_realm(resolved.profile.realm());
    let client = PveClient::with_transport(resolved.target(), resolved.transport())?;
    let session = client.authenticate(&credentials).await?;

    resolved
        .store()
        .save(&credentials)
        .map_err(PveError::CredentialStore)?;

    if args.save_profile {
        let mut cfg = resolved.config.clone();
        let mut profile = resolved.profile.clone();
        profile.username = Some(credentials.username.clone());
        profile.password = None;
        cfg.profiles.insert(resolved.name.clone(), profile);
        if cfg.default_profile.is_none() {
            cfg.default_profile = Some(resolved.name.clone());
        }
        config::save_config(&cfg)?;
    }

    if !global.quiet {
        eprintln!(
            "Logged in to {} as {} (profile '{}')",
            resolved.profile.host,
            session.username(),
            resolved.name
        );
    }
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config()?;
    let name = config::active_profile_name(global, &cfg);
    KeyringStore::new(&name)
        .clear()
        .map_err(PveError::CredentialStore)?;
    if !global.quiet {
        eprintln!("Removed stored credentials for profile '{name}'");
    }
    Ok(())
}

pub async fn version(resolved: &ResolvedProfile, global: &GlobalOpts) -> Result<(), CliError> {
    let client = PveClient::with_transport(resolved.target(), resolved.transport())?;
    let info = client.version().await?;
    let out = output::render_single(global.output, &info, version_detail, |v: &VersionInfo| {
        v.version.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn version_detail(v: &VersionInfo) -> Vec<(&'static str, String)> {
    vec![
        ("Version", v.version.clone()),
        ("Release", output::opt(v.release.as_deref())),
        ("Repository", output::opt(v.repoid.as_deref())),
    ]
}
