//! Shared helpers for command handlers.

use std::io::IsTerminal;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::{Cli, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal on stdin there is nobody to ask, so the
/// operation is refused instead.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Write completion script for `shell` to stdout.
pub fn completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "proxmate", &mut std::io::stdout());
}

/// Report a started background task.
///
/// The UPID goes to stdout so scripts can pass it to `tasks status`.
pub fn print_task(what: &str, upid: &proxmate_api::models::Upid, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!("{what}");
    }
    output::print_output(upid.as_str(), global.quiet);
}
