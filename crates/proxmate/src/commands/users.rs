//! User command handlers.

use proxmate_api::PveClient;
use proxmate_api::models::User;
use tabled::Tabled;

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "User")]
    userid: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            userid: u.userid.clone(),
            name: u.full_name().unwrap_or_else(|| "-".into()),
            email: output::opt(u.email.as_deref()),
            enabled: if u.enable { "yes" } else { "no" }.into(),
            expires: match u.expire {
                None | Some(0) => "never".into(),
                Some(ts) => output::timestamp(ts),
            },
        }
    }
}

pub async fn handle(
    client: &PveClient,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List => {
            let users = client.users().await?;
            let out = output::render_list(
                global.output,
                &users,
                |u| UserRow::from(u),
                |u| u.userid.clone(),
            )?;
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
