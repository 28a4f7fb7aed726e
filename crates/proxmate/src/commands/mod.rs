//! Command handlers, one module per top-level noun.

pub mod auth;
pub mod cluster;
pub mod guests;
pub mod nodes;
pub mod storage;
pub mod tasks;
pub mod users;
pub mod util;

use proxmate_api::PveClient;

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, ResolvedProfile};
use crate::error::CliError;

/// Log in with the resolved profile's credentials.
pub async fn connect(resolved: &ResolvedProfile) -> Result<PveClient, CliError> {
    let credentials = resolved.credentials()?;
    let client = PveClient::with_transport(resolved.target(), resolved.transport())?;
    tracing::debug!(
        profile = %resolved.name,
        host = %resolved.profile.host,
        user = %credentials.userid(),
        "logging in"
    );
    Ok(client.login(&credentials).await?)
}

async fn session(global: &GlobalOpts) -> Result<PveClient, CliError> {
    connect(&config::resolve(global)?).await
}

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    tracing::debug!(command = ?cmd, "dispatching command");
    match cmd {
        // No API access needed
        Command::Completions(args) => {
            util::completions(args.shell);
            Ok(())
        }
        Command::Logout => auth::logout(global),

        // Talk to the API but manage the session themselves
        Command::Login(args) => auth::login(&config::resolve(global)?, &args, global).await,
        Command::Version => auth::version(&config::resolve(global)?, global).await,

        // Everything else runs on a fresh session
        Command::Nodes(args) => nodes::handle(&session(global).await?, args, global).await,
        Command::Vms(args) => guests::handle_vms(&session(global).await?, args, global).await,
        Command::Cts(args) => guests::handle_cts(&session(global).await?, args, global).await,
        Command::Storage(args) => storage::handle(&session(global).await?, args, global).await,
        Command::Tasks(args) => tasks::handle(&session(global).await?, args, global).await,
        Command::Cluster(args) => cluster::handle(&session(global).await?, args, global).await,
        Command::Users(args) => users::handle(&session(global).await?, args, global).await,
    }
}
