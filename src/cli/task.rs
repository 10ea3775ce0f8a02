//! Task add/update/delete commands

use anyhow::{bail, Result};

use crate::error::TaskError;
use crate::model::TaskDraft;
use crate::service::{Delivery, SaveReport, TaskService};
use crate::store::TaskMatch;

use super::short_id;

pub async fn add(service: &mut TaskService, draft: TaskDraft, minutes: i64) -> Result<()> {
    let report = service.save_task(draft, minutes).await?;
    print_saved(&report);
    Ok(())
}

pub async fn update(
    service: &mut TaskService,
    task_query: &str,
    mut draft: TaskDraft,
    minutes: i64,
) -> Result<()> {
    // Unresolved ids are passed through so the miss is logged
    let task_id = match service.store().find_task_by_prefix(task_query)? {
        TaskMatch::Found(task) => task.task_id,
        TaskMatch::Ambiguous => bail!("Task ID prefix '{}' is ambiguous", task_query),
        TaskMatch::Missing => task_query.to_string(),
    };
    draft.task_id = Some(task_id);

    let report = service.save_task(draft, minutes).await?;
    print_saved(&report);
    Ok(())
}

pub fn delete(service: &mut TaskService, task_query: &str) -> Result<()> {
    let (task_id, title) = match service.store().find_task_by_prefix(task_query)? {
        TaskMatch::Found(task) => (task.task_id, task.title),
        TaskMatch::Ambiguous => bail!("Task ID prefix '{}' is ambiguous", task_query),
        TaskMatch::Missing => (task_query.to_string(), String::new()),
    };

    if service.delete_task(&task_id)? {
        println!("Deleted task {} {}", short_id(&task_id), title);
    } else {
        println!("No task matched '{}'; nothing deleted.", task_query);
    }
    Ok(())
}

fn print_saved(report: &SaveReport) {
    let task = &report.task;
    let verb = if report.created { "Created" } else { "Updated" };
    println!(
        "{} task {} '{}' (v{}, {} min tracked, folder '{}')",
        verb,
        short_id(&task.task_id),
        task.title,
        task.version,
        task.tracked_total_min,
        task.folder_path
    );

    match &report.delivery {
        Delivery::LocalOnly => println!("Saved locally only (no webhook configured)."),
        Delivery::Sent(receipt) => println!("Webhook accepted the event (HTTP {}).", receipt.status),
        Delivery::Failed(err) => println!("{}: {}", failure_label(err), err),
    }
}

pub(super) fn failure_label(err: &TaskError) -> &'static str {
    if err.is_delivery() {
        "Webhook delivery failed"
    } else {
        "Event could not be sent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_label_separates_transport_from_encoding() {
        assert_eq!(
            failure_label(&TaskError::Network("refused".to_string())),
            "Webhook delivery failed"
        );
        assert_eq!(
            failure_label(&TaskError::Server {
                status: 502,
                body: String::new()
            }),
            "Webhook delivery failed"
        );
        let encoding = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(
            failure_label(&TaskError::Serialization(encoding)),
            "Event could not be sent"
        );
    }
}
