//! Outbound webhook events
//!
//! Every create/update of a task and every folder creation becomes one
//! event with a fresh idempotency key, so the remote consumer can
//! deduplicate retried deliveries. The event type and the payload shape
//! live in one enum and cannot disagree.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Folder, Task, TaskPriority, TaskStatus};

/// Mutable fields of a task as they stand after a save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub folder_id: String,
    pub folder_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<NaiveDate>,
    pub tracked_total_min: u32,
}

impl From<&Task> for TaskSnapshot {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            tags: task.tags.clone(),
            folder_id: task.folder_id.clone(),
            folder_path: task.folder_path.clone(),
            created_at: task.created_at,
            updated_at: task.updated_at,
            scheduled_for: task.scheduled_for,
            tracked_total_min: task.tracked_total_min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task_id: String,
    pub version: u32,
    pub snapshot: TaskSnapshot,
    /// Minutes tracked in this save, present only when positive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_delta_tracked_min: Option<u32>,
}

/// Event type tag and its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload")]
pub enum EventKind {
    #[serde(rename = "task.created")]
    TaskCreated(TaskPayload),
    #[serde(rename = "task.updated")]
    TaskUpdated(TaskPayload),
    #[serde(rename = "folder.created")]
    FolderCreated(Folder),
}

impl EventKind {
    pub fn event_type(&self) -> &'static str {
        match self {
            EventKind::TaskCreated(_) => "task.created",
            EventKind::TaskUpdated(_) => "task.updated",
            EventKind::FolderCreated(_) => "folder.created",
        }
    }
}

/// Wire body POSTed to the webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    pub idempotency_key: Uuid,
}

impl WebhookEvent {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            idempotency_key: Uuid::new_v4(),
        }
    }

    /// Build a task event from the record as persisted.
    ///
    /// `delta_min` is the session time added by this save; zero or
    /// negative values are omitted from the payload.
    pub fn for_task(task: &Task, created: bool, delta_min: i64) -> Self {
        let payload = TaskPayload {
            task_id: task.task_id.clone(),
            version: task.version,
            snapshot: TaskSnapshot::from(task),
            change_delta_tracked_min: positive_minutes(delta_min),
        };
        let kind = if created {
            EventKind::TaskCreated(payload)
        } else {
            EventKind::TaskUpdated(payload)
        };
        Self::new(kind)
    }

    pub fn folder_created(folder: &Folder) -> Self {
        Self::new(EventKind::FolderCreated(folder.clone()))
    }

    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }
}

/// Clamp a session delta to the non-negative range tracked on tasks
pub fn positive_minutes(delta_min: i64) -> Option<u32> {
    if delta_min > 0 {
        Some(u32::try_from(delta_min).unwrap_or(u32::MAX))
    } else {
        None
    }
}
