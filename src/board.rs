//! Board groupings: Kanban columns and the "today" view

use std::collections::BTreeMap;

use crate::model::{Task, TaskStatus};

/// Group label for tasks without a folder path
pub const NO_FOLDER_LABEL: &str = "Sem Pasta";

#[derive(Debug)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// One column per status, in board order, empty columns included
pub fn columns(tasks: &[Task]) -> Vec<Column<'_>> {
    TaskStatus::ALL
        .iter()
        .map(|&status| Column {
            status,
            tasks: tasks.iter().filter(|t| t.status == status).collect(),
        })
        .collect()
}

/// Group by folder path, each group sorted most urgent first
pub fn group_by_folder_path(tasks: &[Task]) -> BTreeMap<String, Vec<&Task>> {
    let mut grouped: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        let key = if task.folder_path.trim().is_empty() {
            NO_FOLDER_LABEL.to_string()
        } else {
            task.folder_path.clone()
        };
        grouped.entry(key).or_default().push(task);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|t| t.priority.rank());
    }
    grouped
}

/// Keep tasks with at least one tag containing `query`, ignoring case.
/// A blank query keeps everything.
pub fn filter_by_tag(tasks: Vec<Task>, query: Option<&str>) -> Vec<Task> {
    let query = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return tasks,
    };
    tasks
        .into_iter()
        .filter(|t| t.tags.iter().any(|tag| tag.to_lowercase().contains(&query)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskPriority;
    use chrono::Utc;

    fn task(title: &str, status: TaskStatus, priority: TaskPriority, path: &str, tags: &[&str]) -> Task {
        let now = Utc::now();
        Task {
            task_id: title.to_string(),
            version: 1,
            title: title.to_string(),
            description: None,
            status,
            priority,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            folder_id: path.to_string(),
            folder_path: path.to_string(),
            created_at: now,
            updated_at: now,
            scheduled_for: None,
            tracked_total_min: 0,
        }
    }

    #[test]
    fn test_columns_cover_every_status() {
        let tasks = vec![
            task("a", TaskStatus::Doing, TaskPriority::Med, "Work", &[]),
            task("b", TaskStatus::Doing, TaskPriority::Low, "Work", &[]),
            task("c", TaskStatus::Done, TaskPriority::Low, "Work", &[]),
        ];
        let cols = columns(&tasks);
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0].status, TaskStatus::Backlog);
        assert!(cols[0].tasks.is_empty());
        assert_eq!(cols[1].tasks.len(), 2);
        assert_eq!(cols[3].tasks[0].title, "c");
    }

    #[test]
    fn test_group_by_folder_path_sorts_by_priority() {
        let tasks = vec![
            task("low", TaskStatus::Backlog, TaskPriority::Low, "Work", &[]),
            task("high", TaskStatus::Backlog, TaskPriority::High, "Work", &[]),
            task("orphan", TaskStatus::Backlog, TaskPriority::Med, "", &[]),
        ];
        let grouped = group_by_folder_path(&tasks);
        let work: Vec<&str> = grouped["Work"].iter().map(|t| t.title.as_str()).collect();
        assert_eq!(work, vec!["high", "low"]);
        assert_eq!(grouped[NO_FOLDER_LABEL][0].title, "orphan");
    }

    #[test]
    fn test_filter_by_tag_is_case_insensitive_substring() {
        let tasks = vec![
            task("a", TaskStatus::Backlog, TaskPriority::Med, "W", &["Client-X"]),
            task("b", TaskStatus::Backlog, TaskPriority::Med, "W", &["home"]),
            task("c", TaskStatus::Backlog, TaskPriority::Med, "W", &[]),
        ];
        let kept = filter_by_tag(tasks.clone(), Some("client"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "a");

        assert_eq!(filter_by_tag(tasks, Some("  ")).len(), 3);
    }
}
