//! List, board and today views

use anyhow::Result;
use tracing::debug;

use crate::board;
use crate::model::Task;
use crate::service::TaskService;

use super::{short_id, truncate};

pub fn run(service: &TaskService, tag: Option<String>) -> Result<()> {
    debug!(view = ?service.active_view(), tag = ?tag, "listing tasks");
    let tasks = service.tasks_in_view(tag.as_deref())?;

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<8} {:<5} {:<4} {:<6} {:<11} {:<18} {}",
        "ID", "Status", "Prio", "Ver", "Min", "Scheduled", "Folder", "Title"
    );
    println!("{}", "-".repeat(100));

    for task in &tasks {
        print_row(task);
    }

    Ok(())
}

pub fn board(service: &TaskService, tag: Option<String>) -> Result<()> {
    let tasks = service.tasks_in_view(tag.as_deref())?;

    for column in board::columns(&tasks) {
        println!(
            "== {} ({}) ==",
            column.status.as_str().to_uppercase(),
            column.tasks.len()
        );
        for task in column.tasks {
            let tags = if task.tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", task.tags.join(", "))
            };
            println!(
                "  {:<10} {:<5} {}{}",
                short_id(&task.task_id),
                task.priority.as_str(),
                truncate(&task.title, 50),
                tags
            );
        }
        println!();
    }

    Ok(())
}

/// Tasks due today or overdue, grouped by folder
pub fn today(service: &TaskService, tag: Option<String>) -> Result<()> {
    let tasks = service.tasks_in_view(tag.as_deref())?;

    if tasks.is_empty() {
        println!("Nenhuma tarefa agendada para hoje ou atrasada. Bom trabalho!");
        return Ok(());
    }

    for (folder_path, group) in board::group_by_folder_path(&tasks) {
        println!("{}", folder_path);
        println!("{}", "-".repeat(folder_path.chars().count().max(10)));
        for task in group {
            let scheduled = task
                .scheduled_for
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<10} {:<5} {:<11} {}",
                short_id(&task.task_id),
                task.priority.as_str(),
                scheduled,
                truncate(&task.title, 50)
            );
        }
        println!();
    }

    Ok(())
}

fn print_row(task: &Task) {
    let scheduled = task
        .scheduled_for
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{:<10} {:<8} {:<5} {:<4} {:<6} {:<11} {:<18} {}",
        short_id(&task.task_id),
        task.status.as_str(),
        task.priority.as_str(),
        task.version,
        task.tracked_total_min,
        scheduled,
        truncate(&task.folder_path, 18),
        truncate(&task.title, 40),
    );
}
