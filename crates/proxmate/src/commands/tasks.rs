//! Task command handlers.

use proxmate_api::PveClient;
use proxmate_api::models::{Task, TaskQuery, TaskStatus, Upid};
use tabled::Tabled;

use crate::cli::{GlobalOpts, TasksArgs, TasksCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Type")]
    task_type: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "UPID")]
    upid: String,
}

impl From<&Task> for TaskRow {
    fn from(t: &Task) -> Self {
        let status = if t.is_running() {
            "running".to_owned()
        } else {
            output::opt(t.status.as_deref())
        };
        Self {
            started: output::timestamp(t.starttime),
            task_type: t.task_type.clone(),
            id: output::opt(t.id.as_deref()),
            user: t.user.clone(),
            status,
            upid: t.upid.to_string(),
        }
    }
}

fn status_detail(s: &TaskStatus) -> Vec<(&'static str, String)> {
    let outcome = match s.succeeded() {
        None => "in progress",
        Some(true) => "succeeded",
        Some(false) => "failed",
    };
    vec![
        ("Status", s.status.clone()),
        ("Outcome", outcome.into()),
        ("Exit status", output::opt(s.exitstatus.as_deref())),
        ("Type", output::opt(s.task_type.as_deref())),
        ("ID", output::opt(s.id.as_deref())),
        ("User", output::opt(s.user.as_deref())),
        (
            "Started",
            s.starttime.map_or_else(|| "-".into(), output::timestamp),
        ),
    ]
}

pub async fn handle(
    client: &PveClient,
    args: TasksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TasksCommand::List {
            node,
            limit,
            start,
            vmid,
            errors,
        } => {
            let query = TaskQuery {
                limit,
                start,
                vmid,
                errors_only: errors,
            };
            let tasks = client.tasks(&node, query).await?;
            let out = output::render_list(
                global.output,
                &tasks,
                |t| TaskRow::from(t),
                |t| t.upid.to_string(),
            )?;
            output::print_output(&out, global.quiet);
        }

        TasksCommand::Status { node, upid } => {
            let status = client.task_status(&node, &Upid::new(upid)).await?;
            let out = output::render_single(global.output, &status, status_detail, |s| {
                s.exitstatus.clone().unwrap_or_else(|| s.status.clone())
            })?;
            output::print_output(&out, global.quiet);
        }

        TasksCommand::Stop { node, upid } => {
            client.stop_task(&node, &Upid::new(upid.clone())).await?;
            if !global.quiet {
                eprintln!("Stop requested for {upid}");
            }
        }
    }
    Ok(())
}
