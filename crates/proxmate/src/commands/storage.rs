//! Storage command handlers.

use proxmate_api::PveClient;
use proxmate_api::models::{Storage, StorageContent};
use tabled::Tabled;

use crate::cli::{GlobalOpts, StorageArgs, StorageCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct StorageRow {
    #[tabled(rename = "Storage")]
    storage: String,
    #[tabled(rename = "Type")]
    storage_type: String,
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "Usage")]
    usage: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Shared")]
    shared: String,
}

impl From<&Storage> for StorageRow {
    fn from(s: &Storage) -> Self {
        Self {
            storage: s.storage.clone(),
            storage_type: s.storage_type.clone(),
            content: s.content.join(","),
            usage: output::usage(s.used, s.total),
            active: yes_no(s.active),
            shared: yes_no(s.shared),
        }
    }
}

#[derive(Tabled)]
struct ContentRow {
    #[tabled(rename = "Volume")]
    volid: String,
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "VMID")]
    vmid: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&StorageContent> for ContentRow {
    fn from(c: &StorageContent) -> Self {
        Self {
            volid: c.volid.clone(),
            content: c.content.clone(),
            format: output::opt(c.format.as_deref()),
            size: output::bytes(c.size),
            vmid: c.vmid.map_or_else(|| "-".into(), |id| id.to_string()),
            created: c.ctime.map_or_else(|| "-".into(), output::timestamp),
        }
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.into()
}

pub async fn handle(
    client: &PveClient,
    args: StorageArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        StorageCommand::List { node } => {
            let storages = client.storages(&node).await?;
            output::render_list(
                global.output,
                &storages,
                |s| StorageRow::from(s),
                |s| s.storage.clone(),
            )?
        }

        StorageCommand::Content {
            node,
            storage,
            content,
        } => {
            let mut volumes = client.storage_content(&node, &storage).await?;
            if let Some(ref kind) = content {
                volumes.retain(|v| &v.content == kind);
            }
            output::render_list(
                global.output,
                &volumes,
                |v| ContentRow::from(v),
                |v| v.volid.clone(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
