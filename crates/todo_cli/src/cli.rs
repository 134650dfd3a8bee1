//! Command-line front-end over [`TaskClient`].
//!
//! Every invocation loads the list, performs at most one action through the
//! optimistic-sync client, then prints notices and the resulting list.

use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use todo_client::{HttpTodoApi, LocalTask, SyncState, TaskClient, TodoApi, DEFAULT_API_URL};
use todo_core::TaskId;

const MIN_PREFIX_LEN: usize = 4;
const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Parser)]
#[command(name = "todo", about = "Manage the shared todo list", version)]
pub struct Cli {
    /// Collection URL of the todo service
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// trace|debug|info|warn|error
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Show all todos (default)
    List,
    /// Add a todo
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Flip a todo between open and completed
    Toggle { id: String },
    /// Replace a todo's text
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Delete a todo
    Delete { id: String },
}

impl Cli {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let mut client = TaskClient::new(HttpTodoApi::new(self.api_url));
        let loaded = client.load().await;
        let command = self.command.unwrap_or(Command::List);

        let applied = if loaded {
            apply(&mut client, command).await?
        } else {
            false
        };

        for notice in client.take_notices() {
            eprintln!("! {notice}");
        }
        print!("{}", render_list(client.tasks()));

        if !applied {
            bail!("the requested change did not take effect");
        }
        Ok(())
    }
}

async fn apply<A: TodoApi>(client: &mut TaskClient<A>, command: Command) -> anyhow::Result<bool> {
    let applied = match command {
        Command::List => true,
        Command::Add { text } => client.add(&text.join(" ")).await,
        Command::Toggle { id } => {
            let id = resolve_id(client.tasks(), &id)?;
            client.toggle_complete(id).await
        }
        Command::Edit { id, text } => {
            let id = resolve_id(client.tasks(), &id)?;
            client.begin_editing(id);
            client.set_draft(text.join(" "));
            client.commit_edit().await
        }
        Command::Delete { id } => {
            let id = resolve_id(client.tasks(), &id)?;
            client.delete(id).await
        }
    };
    Ok(applied)
}

/// Resolves a full id or a unique, case-insensitive id prefix.
fn resolve_id(tasks: &[LocalTask], needle: &str) -> anyhow::Result<TaskId> {
    let needle = needle.trim().to_ascii_lowercase();
    if let Ok(id) = TaskId::parse_str(&needle) {
        return Ok(id);
    }
    if needle.len() < MIN_PREFIX_LEN {
        bail!("id prefix `{needle}` is too short; use at least {MIN_PREFIX_LEN} characters");
    }

    let mut matches = tasks
        .iter()
        .map(|local| local.task.id)
        .filter(|id| id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (Some(_), Some(_)) => Err(anyhow!("id prefix `{needle}` matches more than one todo")),
        (None, _) => Err(anyhow!("no todo matches id `{needle}`")),
    }
}

fn render_list(tasks: &[LocalTask]) -> String {
    if tasks.is_empty() {
        return "(no todos)\n".to_string();
    }
    tasks
        .iter()
        .map(|local| {
            let mark = if local.task.completed { "x" } else { " " };
            let pending = match local.sync_state() {
                SyncState::Synced => "",
                SyncState::Pending => " (pending)",
            };
            let id = local.task.id.to_string();
            format!(
                "[{mark}] {} {}{pending}\n",
                &id[..SHORT_ID_LEN],
                local.task.task
            )
        })
        .collect()
}
