//! Task service: orchestrates local saves and webhook mirroring
//!
//! Local state is always written first. When a webhook URL is configured
//! the saved record is sent as a single event; a failed delivery is
//! logged and reported but never rolls back the local write.

use chrono::{Local, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::board::filter_by_tag;
use crate::error::{Result, TaskError};
use crate::event::{positive_minutes, WebhookEvent};
use crate::model::{normalize_tags, ActiveView, Folder, Task, TaskDraft};
use crate::oplog::OperationLog;
use crate::store::TaskStore;
use crate::webhook::{DeliveryReceipt, EventSender};

/// Outcome of the remote half of a save
#[derive(Debug)]
pub enum Delivery {
    /// No webhook configured; nothing was sent
    LocalOnly,
    Sent(DeliveryReceipt),
    Failed(TaskError),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent(_))
    }
}

#[derive(Debug)]
pub struct SaveReport {
    pub task: Task,
    pub created: bool,
    pub delivery: Delivery,
}

#[derive(Debug)]
pub struct FolderReport {
    pub folder: Folder,
    pub delivery: Delivery,
}

/// Application state owned by the top-level process
pub struct TaskService {
    store: TaskStore,
    sender: Box<dyn EventSender>,
    webhook_url: Option<String>,
    active_view: ActiveView,
    log: OperationLog,
}

impl TaskService {
    pub fn new(store: TaskStore, sender: Box<dyn EventSender>, webhook_url: Option<String>) -> Self {
        Self {
            store,
            sender,
            webhook_url: clean_url(webhook_url),
            active_view: ActiveView::All,
            log: OperationLog::default(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn active_view(&self) -> &ActiveView {
        &self.active_view
    }

    pub fn set_active_view(&mut self, view: ActiveView) {
        self.active_view = view;
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    /// Blank URLs switch to local-only mode
    pub fn set_webhook_url(&mut self, url: Option<String>) {
        self.webhook_url = clean_url(url);
    }

    // ============================================
    // TASKS
    // ============================================

    /// Create or update a task, then mirror it to the webhook.
    ///
    /// `session_minutes` is time tracked during this edit; only positive
    /// values are added to `tracked_total_min`.
    pub async fn save_task(&mut self, draft: TaskDraft, session_minutes: i64) -> Result<SaveReport> {
        if let Err(err) = validate(&draft) {
            self.log.push(format!("Erro: {}", err));
            return Err(err);
        }

        let created = draft.is_new();
        let task = match self.persist(draft, session_minutes) {
            Ok(task) => task,
            Err(err) => {
                if !matches!(err, TaskError::NotFound(_)) {
                    self.log.push(format!("Falha ao salvar tarefa: {}", err));
                }
                return Err(err);
            }
        };

        if created {
            self.log.push(format!("Nova tarefa criada: {}", task.title));
        } else {
            self.log.push(format!("Tarefa atualizada: {}", task.title));
        }
        info!(task_id = %task.task_id, version = task.version, created, "task saved");

        let delivery = match self.webhook_url.clone() {
            None => {
                self.log
                    .push("Webhook não configurado: tarefa salva apenas localmente.");
                Delivery::LocalOnly
            }
            Some(url) => {
                self.log
                    .push(format!("Preparando evento de webhook para: {}", task.title));
                let event = WebhookEvent::for_task(&task, created, session_minutes);
                match self.sender.send(&url, &event).await {
                    Ok(receipt) => {
                        info!(
                            task_id = %task.task_id,
                            idempotency_key = %event.idempotency_key,
                            status = receipt.status,
                            "webhook event delivered"
                        );
                        self.log
                            .push(format!("Evento enviado com sucesso para: {}", task.title));
                        Delivery::Sent(receipt)
                    }
                    Err(err) => {
                        warn!(task_id = %task.task_id, error = %err, "webhook event failed");
                        self.log.push(format!("Falha ao enviar evento: {}", err));
                        Delivery::Failed(err)
                    }
                }
            }
        };

        Ok(SaveReport {
            task,
            created,
            delivery,
        })
    }

    fn persist(&mut self, draft: TaskDraft, session_minutes: i64) -> Result<Task> {
        let added = positive_minutes(session_minutes).unwrap_or(0);
        let now = Utc::now();

        let task = match draft.task_id.clone() {
            None => {
                // A folder-scoped view wins over the draft's folder
                let requested = self
                    .active_view
                    .folder_id()
                    .map(str::to_string)
                    .or_else(|| draft.folder_id.clone());
                let folder = self.resolve_folder(requested)?;

                Task {
                    task_id: Uuid::new_v4().to_string(),
                    version: 1,
                    title: draft.title.unwrap_or_default().trim().to_string(),
                    description: draft.description.flatten().and_then(non_blank),
                    status: draft.status.unwrap_or_default(),
                    priority: draft.priority.unwrap_or_default(),
                    tags: draft.tags.map(normalize_tags).unwrap_or_default(),
                    folder_id: folder.folder_id,
                    folder_path: folder.path,
                    created_at: now,
                    updated_at: now,
                    scheduled_for: draft.scheduled_for.flatten(),
                    tracked_total_min: added,
                }
            }
            Some(task_id) => {
                let Some(mut task) = self.store.get_task(&task_id)? else {
                    self.log
                        .push(format!("Erro: Tarefa com ID {} não encontrada.", task_id));
                    warn!(task_id = %task_id, "update target missing");
                    return Err(TaskError::NotFound(task_id));
                };

                if let Some(title) = draft.title {
                    task.title = title.trim().to_string();
                }
                if let Some(description) = draft.description {
                    task.description = description.and_then(non_blank);
                }
                if let Some(status) = draft.status {
                    task.status = status;
                }
                if let Some(priority) = draft.priority {
                    task.priority = priority;
                }
                if let Some(tags) = draft.tags {
                    task.tags = normalize_tags(tags);
                }
                if let Some(folder_id) = draft.folder_id {
                    let folder = self.resolve_folder(Some(folder_id))?;
                    task.folder_id = folder.folder_id;
                    task.folder_path = folder.path;
                }
                if let Some(scheduled_for) = draft.scheduled_for {
                    task.scheduled_for = scheduled_for;
                }

                task.version = task.version.saturating_add(1);
                task.tracked_total_min = task.tracked_total_min.saturating_add(added);
                task.updated_at = now;
                task
            }
        };

        self.store.put_task(&task)?;
        Ok(task)
    }

    /// Look up the requested folder, falling back to the Inbox when it is
    /// absent or unknown.
    fn resolve_folder(&mut self, requested: Option<String>) -> Result<Folder> {
        if let Some(folder_id) = requested {
            if let Some(folder) = self.store.get_folder(&folder_id)? {
                return Ok(folder);
            }
            let inbox = self.store.default_folder()?;
            self.log.push(format!(
                "Pasta {} não encontrada; usando {}.",
                folder_id, inbox.name
            ));
            warn!(folder_id = %folder_id, "unknown folder, using default");
            return Ok(inbox);
        }
        self.store.default_folder()
    }

    /// Remove a task locally. No remote event exists for deletions.
    pub fn delete_task(&mut self, task_id: &str) -> Result<bool> {
        match self.store.delete_task(task_id) {
            Ok(removed) => {
                if removed {
                    self.log.push(format!("Tarefa removida: {}", task_id));
                } else {
                    self.log
                        .push(format!("Nenhuma tarefa removida: {} não existe.", task_id));
                }
                info!(task_id, removed, "task deleted");
                Ok(removed)
            }
            Err(err) => {
                self.log.push(format!("Falha ao remover tarefa: {}", err));
                Err(err)
            }
        }
    }

    /// Tasks visible in the active view, optionally filtered by tag
    pub fn tasks_in_view(&self, tag_query: Option<&str>) -> Result<Vec<Task>> {
        self.tasks_in_view_on(Local::now().date_naive(), tag_query)
    }

    /// Same as [`tasks_in_view`](Self::tasks_in_view) with an explicit "today"
    pub fn tasks_in_view_on(&self, today: NaiveDate, tag_query: Option<&str>) -> Result<Vec<Task>> {
        let tasks = match &self.active_view {
            ActiveView::All => self.store.list_tasks()?,
            ActiveView::Today => self.store.list_tasks_scheduled_on_or_before(today)?,
            ActiveView::Folder(folder_id) => self.store.list_tasks_by_folder(folder_id)?,
        };
        Ok(filter_by_tag(tasks, tag_query))
    }

    // ============================================
    // FOLDERS
    // ============================================

    pub async fn create_folder(&mut self, name: &str) -> Result<FolderReport> {
        let name = name.trim();
        if name.is_empty() {
            let err = TaskError::Validation("folder name must not be empty".to_string());
            self.log.push(format!("Falha ao criar pasta: {}", err));
            return Err(err);
        }

        let folder = Folder {
            folder_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name: name.to_string(),
            path: name.to_string(),
            parent_folder_id: None,
        };
        if let Err(err) = self.store.add_folder(&folder) {
            self.log.push(format!("Falha ao criar pasta: {}", err));
            return Err(err);
        }
        self.log
            .push(format!("Pasta criada localmente: {}", folder.name));
        info!(folder_id = %folder.folder_id, "folder created");

        let delivery = match self.webhook_url.clone() {
            None => {
                self.log
                    .push("Webhook não configurado: pasta salva apenas localmente.");
                Delivery::LocalOnly
            }
            Some(url) => {
                let event = WebhookEvent::folder_created(&folder);
                match self.sender.send(&url, &event).await {
                    Ok(receipt) => {
                        self.log.push(format!(
                            "Evento de pasta criada enviado para: {}",
                            folder.name
                        ));
                        Delivery::Sent(receipt)
                    }
                    Err(err) => {
                        warn!(folder_id = %folder.folder_id, error = %err, "folder event failed");
                        self.log
                            .push(format!("Falha ao enviar evento de pasta: {}", err));
                        Delivery::Failed(err)
                    }
                }
            }
        };

        Ok(FolderReport { folder, delivery })
    }
}

fn validate(draft: &TaskDraft) -> Result<()> {
    match draft.title.as_deref().map(str::trim) {
        Some("") => Err(TaskError::Validation("title must not be empty".to_string())),
        None if draft.is_new() => Err(TaskError::Validation("title is required".to_string())),
        _ => Ok(()),
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn clean_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}
