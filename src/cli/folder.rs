use anyhow::Result;

use crate::service::{Delivery, TaskService};

use super::short_id;

pub async fn add(service: &mut TaskService, name: String) -> Result<()> {
    let report = service.create_folder(&name).await?;
    println!(
        "Folder '{}' created with ID: {}",
        report.folder.name, report.folder.folder_id
    );
    if report.delivery.is_sent() {
        println!("Folder event sent to the webhook.");
    } else if let Delivery::Failed(err) = &report.delivery {
        println!("{}: {}", super::task::failure_label(err), err);
    }
    Ok(())
}

pub fn list(service: &TaskService) -> Result<()> {
    let folders = service.store().list_folders()?;
    if folders.is_empty() {
        println!("No folders found.");
        return Ok(());
    }

    println!("{:<10} {:<24} {:<6} {}", "ID", "Name", "Tasks", "Created");
    println!("{}", "-".repeat(70));
    for f in folders {
        let count = service.store().list_tasks_by_folder(&f.folder_id)?.len();
        println!(
            "{:<10} {:<24} {:<6} {}",
            short_id(&f.folder_id),
            f.name,
            count,
            f.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
