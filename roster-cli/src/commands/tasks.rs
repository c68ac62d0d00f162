use anyhow::{Context, Result};
use roster::domain::models::{Status, Task, TaskDraft, TaskId};
use roster::domain::ports::outbound::{AuthClient, KeyValueStore, TableStore};
use roster::domain::RecordError;

use crate::app::App;
use crate::cli::TaskCommand;
use crate::prompt::confirm;

pub async fn run<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
    command: TaskCommand,
) -> Result<()> {
    let mut board = app.task_board();

    match command {
        TaskCommand::List { tab, sort } => {
            board.reload().await.context("Failed to load tasks")?;
            let groups = board.groups(tab, sort);
            if groups.is_empty() {
                println!("No tasks.");
            }
            for group in groups {
                println!("{} ({})", group.label, group.len());
                for task in group.records {
                    println!("  {}", format_task(task));
                }
            }
        }
        TaskCommand::Add {
            title,
            due,
            priority,
            section,
        } => {
            let draft = TaskDraft {
                title,
                due_date: Some(due),
                priority,
                section,
                status: None,
            };
            board.create(&draft).await?;
            println!("Task added.");
        }
        TaskCommand::Edit {
            id,
            title,
            due,
            priority,
            section,
            status,
        } => {
            board.reload().await.context("Failed to load tasks")?;
            let task = board
                .find(TaskId::new(id))
                .ok_or(RecordError::NotFound(id))?;

            let mut draft = TaskDraft::from_task(task);
            if let Some(title) = title {
                draft.title = title;
            }
            if due.is_some() {
                draft.due_date = due;
            }
            if let Some(priority) = priority {
                draft.priority = priority;
            }
            if let Some(section) = section {
                draft.section = section;
            }
            draft.status = status;

            board.update(TaskId::new(id), &draft).await?;
            println!("Task {id} updated.");
        }
        TaskCommand::Toggle { id } => {
            board.reload().await.context("Failed to load tasks")?;
            let status = board.toggle_done(TaskId::new(id)).await?;
            println!("Task {id} is now {status}.");
        }
        TaskCommand::Remove { id, yes } => {
            if !yes && !confirm(&format!("Remove task {id}?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            board.remove(TaskId::new(id)).await?;
            println!("Task {id} removed.");
        }
    }
    Ok(())
}

fn format_task(task: &Task) -> String {
    let check = match task.status {
        Status::Done => "[x]",
        Status::InProgress => "[~]",
        Status::Todo => "[ ]",
    };
    let due = task
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "no due date".to_string());
    format!(
        "{check} #{} {}  (due {due}, {})",
        task.id, task.title, task.priority
    )
}
