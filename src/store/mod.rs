//! Local task and folder storage with SQLite
//!
//! Writes are last-writer-wins upserts; there is no cross-record
//! transaction beyond the first-run seed.

mod schema;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Folder, Task, TaskPriority, TaskStatus};

pub use schema::{SCHEMA, SEEDED_VERSION};

/// Name and path of the folder created on first run
pub const INBOX_FOLDER_NAME: &str = "Caixa de Entrada";

const WELCOME_TITLE: &str = "Bem-vindo ao seu novo gerenciador de tarefas!";
const WELCOME_DESCRIPTION: &str = "Este é um app local-first. Suas tarefas ficam salvas localmente e são sincronizadas com o Google Sheets quando um webhook está configurado.";

const TASK_COLUMNS: &str = "task_id, version, title, description, status, priority, tags, \
     folder_id, folder_path, created_at, updated_at, scheduled_for, tracked_total_min";

const FOLDER_COLUMNS: &str = "folder_id, created_at, name, path, parent_folder_id";

/// Result of resolving a task id or id prefix
#[derive(Debug)]
pub enum TaskMatch {
    Found(Task),
    /// More than one task shares the prefix
    Ambiguous,
    Missing,
}

impl TaskMatch {
    pub fn found(self) -> Option<Task> {
        match self {
            TaskMatch::Found(task) => Some(task),
            _ => None,
        }
    }
}

pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        store.seed_if_new()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Write the Inbox folder and the welcome task the first time the
    /// database is initialized.
    fn seed_if_new(&self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if user_version >= SEEDED_VERSION {
            return Ok(());
        }

        let inbox = inbox_folder();
        let now = inbox.created_at;
        let welcome = Task {
            task_id: Uuid::new_v4().to_string(),
            version: 1,
            title: WELCOME_TITLE.to_string(),
            description: Some(WELCOME_DESCRIPTION.to_string()),
            status: TaskStatus::Backlog,
            priority: TaskPriority::Med,
            tags: Vec::new(),
            folder_id: inbox.folder_id.clone(),
            folder_path: inbox.path.clone(),
            created_at: now,
            updated_at: now,
            scheduled_for: None,
            tracked_total_min: 0,
        };

        let tx = self.conn.unchecked_transaction()?;
        self.add_folder(&inbox)?;
        self.put_task(&welcome)?;
        tx.pragma_update(None, "user_version", SEEDED_VERSION)?;
        tx.commit()?;

        info!(folder_id = %inbox.folder_id, "seeded local store");
        Ok(())
    }

    // ============================================
    // TASKS
    // ============================================

    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE task_id = ?", TASK_COLUMNS),
                params![task_id],
                map_task,
            )
            .optional()?;
        Ok(task)
    }

    /// Resolve a task by full id or unique id prefix
    pub fn find_task_by_prefix(&self, query: &str) -> Result<TaskMatch> {
        if let Some(task) = self.get_task(query)? {
            return Ok(TaskMatch::Found(task));
        }
        if query.is_empty() {
            return Ok(TaskMatch::Missing);
        }

        // Literal comparison; LIKE would treat % and _ in the query as wildcards
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE substr(task_id, 1, length(?1)) = ?1 LIMIT 2",
            TASK_COLUMNS
        ))?;
        let mut matches = stmt
            .query_map(params![query], map_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(match matches.len() {
            0 => TaskMatch::Missing,
            1 => TaskMatch::Found(matches.remove(0)),
            _ => TaskMatch::Ambiguous,
        })
    }

    /// Insert or replace a task row
    pub fn put_task(&self, task: &Task) -> Result<()> {
        let tags = serde_json::to_string(&task.tags)?;
        self.conn.execute(
            r#"INSERT INTO tasks
               (task_id, version, title, description, status, priority, tags,
                folder_id, folder_path, created_at, updated_at, scheduled_for, tracked_total_min)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(task_id) DO UPDATE SET
                   version = excluded.version,
                   title = excluded.title,
                   description = excluded.description,
                   status = excluded.status,
                   priority = excluded.priority,
                   tags = excluded.tags,
                   folder_id = excluded.folder_id,
                   folder_path = excluded.folder_path,
                   updated_at = excluded.updated_at,
                   scheduled_for = excluded.scheduled_for,
                   tracked_total_min = excluded.tracked_total_min"#,
            params![
                task.task_id,
                task.version,
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.as_str(),
                tags,
                task.folder_id,
                task.folder_path,
                task.created_at,
                task.updated_at,
                task.scheduled_for,
                task.tracked_total_min,
            ],
        )?;
        debug!(task_id = %task.task_id, version = task.version, "task written");
        Ok(())
    }

    /// Remove a task. Returns whether a row existed.
    pub fn delete_task(&self, task_id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE task_id = ?", params![task_id])?;
        Ok(removed > 0)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!("SELECT {} FROM tasks ORDER BY updated_at DESC", TASK_COLUMNS),
            [],
        )
    }

    pub fn list_tasks_by_folder(&self, folder_id: &str) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {} FROM tasks WHERE folder_id = ? ORDER BY updated_at DESC",
                TASK_COLUMNS
            ),
            params![folder_id],
        )
    }

    /// Tasks scheduled for `date` or earlier. Unscheduled tasks are excluded.
    pub fn list_tasks_scheduled_on_or_before(&self, date: NaiveDate) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {} FROM tasks
                 WHERE scheduled_for IS NOT NULL AND scheduled_for <= ?
                 ORDER BY scheduled_for, updated_at DESC",
                TASK_COLUMNS
            ),
            params![date],
        )
    }

    fn query_tasks<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_task)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ============================================
    // FOLDERS
    // ============================================

    pub fn add_folder(&self, folder: &Folder) -> Result<()> {
        self.conn.execute(
            "INSERT INTO folders (folder_id, created_at, name, path, parent_folder_id)
             VALUES (?, ?, ?, ?, ?)",
            params![
                folder.folder_id,
                folder.created_at,
                folder.name,
                folder.path,
                folder.parent_folder_id,
            ],
        )?;
        Ok(())
    }

    pub fn get_folder(&self, folder_id: &str) -> Result<Option<Folder>> {
        let folder = self
            .conn
            .query_row(
                &format!("SELECT {} FROM folders WHERE folder_id = ?", FOLDER_COLUMNS),
                params![folder_id],
                map_folder,
            )
            .optional()?;
        Ok(folder)
    }

    pub fn list_folders(&self) -> Result<Vec<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM folders ORDER BY created_at, rowid",
            FOLDER_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_folder)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// The earliest folder, i.e. the seeded Inbox. Recreated if the
    /// folders table is empty.
    pub fn default_folder(&self) -> Result<Folder> {
        let folder = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM folders ORDER BY created_at, rowid LIMIT 1",
                    FOLDER_COLUMNS
                ),
                [],
                map_folder,
            )
            .optional()?;

        match folder {
            Some(folder) => Ok(folder),
            None => {
                let inbox = inbox_folder();
                self.add_folder(&inbox)?;
                Ok(inbox)
            }
        }
    }

    /// Resolve a folder by id, unique id prefix or exact name
    pub fn find_folder(&self, query: &str) -> Result<Option<Folder>> {
        let folders = self.list_folders()?;
        if let Some(f) = folders.iter().find(|f| f.folder_id == query) {
            return Ok(Some(f.clone()));
        }
        if let Some(f) = folders.iter().find(|f| f.name == query) {
            return Ok(Some(f.clone()));
        }
        let mut by_prefix = folders.into_iter().filter(|f| f.folder_id.starts_with(query));
        match (by_prefix.next(), by_prefix.next()) {
            (Some(f), None) => Ok(Some(f)),
            _ => Ok(None),
        }
    }
}

fn inbox_folder() -> Folder {
    Folder {
        folder_id: Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        name: INBOX_FOLDER_NAME.to_string(),
        path: INBOX_FOLDER_NAME.to_string(),
        parent_folder_id: None,
    }
}

// ============================================
// ROW MAPPING
// ============================================

fn map_task(row: &Row) -> rusqlite::Result<Task> {
    let tags: String = row.get(6)?;
    Ok(Task {
        task_id: row.get(0)?,
        version: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: parse_column::<TaskStatus>(row, 4)?,
        priority: parse_column::<TaskPriority>(row, 5)?,
        tags: serde_json::from_str(&tags).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        folder_id: row.get(7)?,
        folder_path: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        scheduled_for: row.get(11)?,
        tracked_total_min: row.get(12)?,
    })
}

fn map_folder(row: &Row) -> rusqlite::Result<Folder> {
    Ok(Folder {
        folder_id: row.get(0)?,
        created_at: row.get(1)?,
        name: row.get(2)?,
        path: row.get(3)?,
        parent_folder_id: row.get(4)?,
    })
}

fn parse_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task(store: &TaskStore, title: &str) -> Task {
        let inbox = store.default_folder().unwrap();
        let now = Utc::now();
        Task {
            task_id: Uuid::new_v4().to_string(),
            version: 1,
            title: title.to_string(),
            description: None,
            status: TaskStatus::Backlog,
            priority: TaskPriority::Med,
            tags: vec!["work".to_string()],
            folder_id: inbox.folder_id.clone(),
            folder_path: inbox.path,
            created_at: now,
            updated_at: now,
            scheduled_for: None,
            tracked_total_min: 0,
        }
    }

    #[test]
    fn test_first_open_seeds_inbox_and_welcome_task() {
        let store = TaskStore::open_in_memory().unwrap();

        let folders = store.list_folders().unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, INBOX_FOLDER_NAME);
        assert_eq!(folders[0].path, INBOX_FOLDER_NAME);

        let tasks = store.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].folder_id, folders[0].folder_id);
        assert_eq!(tasks[0].version, 1);
    }

    #[test]
    fn test_reopen_does_not_reseed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.db");

        {
            let store = TaskStore::open(&path).unwrap();
            let welcome = store.list_tasks().unwrap().remove(0);
            assert!(store.delete_task(&welcome.task_id).unwrap());
        }

        let store = TaskStore::open(&path).unwrap();
        assert_eq!(store.list_folders().unwrap().len(), 1);
        assert!(store.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_put_and_get_round_trips_all_fields() {
        let store = TaskStore::open_in_memory().unwrap();
        let mut task = sample_task(&store, "Write report");
        task.description = Some("quarterly".to_string());
        task.priority = TaskPriority::High;
        task.scheduled_for = NaiveDate::from_ymd_opt(2025, 3, 14);
        task.tracked_total_min = 45;
        store.put_task(&task).unwrap();

        let loaded = store.get_task(&task.task_id).unwrap().unwrap();
        assert_eq!(loaded.title, "Write report");
        assert_eq!(loaded.description.as_deref(), Some("quarterly"));
        assert_eq!(loaded.priority, TaskPriority::High);
        assert_eq!(loaded.tags, vec!["work".to_string()]);
        assert_eq!(loaded.scheduled_for, NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(loaded.tracked_total_min, 45);
        assert_eq!(loaded.created_at.timestamp_millis(), task.created_at.timestamp_millis());
    }

    #[test]
    fn test_put_overwrites_existing_row() {
        let store = TaskStore::open_in_memory().unwrap();
        let mut task = sample_task(&store, "Draft");
        store.put_task(&task).unwrap();

        task.version = 2;
        task.status = TaskStatus::Done;
        store.put_task(&task).unwrap();

        let loaded = store.get_task(&task.task_id).unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.status, TaskStatus::Done);
        assert_eq!(store.list_tasks().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = TaskStore::open_in_memory().unwrap();
        let task = sample_task(&store, "Temporary");
        store.put_task(&task).unwrap();

        assert!(store.delete_task(&task.task_id).unwrap());
        assert!(!store.delete_task(&task.task_id).unwrap());
        assert!(store.get_task(&task.task_id).unwrap().is_none());
        assert!(store
            .list_tasks()
            .unwrap()
            .iter()
            .all(|t| t.task_id != task.task_id));
    }

    #[test]
    fn test_list_by_folder() {
        let store = TaskStore::open_in_memory().unwrap();
        let work = Folder {
            folder_id: Uuid::new_v4().to_string(),
            created_at: Utc::now() + Duration::seconds(1),
            name: "Work".to_string(),
            path: "Work".to_string(),
            parent_folder_id: None,
        };
        store.add_folder(&work).unwrap();

        let mut task = sample_task(&store, "In work");
        task.folder_id = work.folder_id.clone();
        task.folder_path = work.path.clone();
        store.put_task(&task).unwrap();

        let in_work = store.list_tasks_by_folder(&work.folder_id).unwrap();
        assert_eq!(in_work.len(), 1);
        assert_eq!(in_work[0].title, "In work");

        // Inbox stays the default folder
        let default = store.default_folder().unwrap();
        assert_eq!(default.name, INBOX_FOLDER_NAME);
        assert_eq!(store.find_folder("Work").unwrap().unwrap().folder_id, work.folder_id);
    }

    #[test]
    fn test_scheduled_on_or_before() {
        let store = TaskStore::open_in_memory().unwrap();
        let cutoff = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();

        for (title, date) in [
            ("overdue", NaiveDate::from_ymd_opt(2025, 6, 1)),
            ("due", Some(cutoff)),
            ("later", NaiveDate::from_ymd_opt(2025, 6, 11)),
            ("unscheduled", None),
        ] {
            let mut task = sample_task(&store, title);
            task.scheduled_for = date;
            store.put_task(&task).unwrap();
        }

        let titles: Vec<String> = store
            .list_tasks_scheduled_on_or_before(cutoff)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["overdue".to_string(), "due".to_string()]);
    }

    #[test]
    fn test_find_task_by_prefix() {
        let store = TaskStore::open_in_memory().unwrap();
        let task = sample_task(&store, "Prefixed");
        store.put_task(&task).unwrap();

        let found = store.find_task_by_prefix(&task.task_id[..8]).unwrap().found().unwrap();
        assert_eq!(found.task_id, task.task_id);
        assert!(matches!(store.find_task_by_prefix("zzzz").unwrap(), TaskMatch::Missing));
    }

    #[test]
    fn test_prefix_wildcards_match_literally() {
        let store = TaskStore::open_in_memory().unwrap();
        assert_eq!(store.list_tasks().unwrap().len(), 1);

        for query in ["%", "_", "________-", "%-%"] {
            assert!(
                matches!(store.find_task_by_prefix(query).unwrap(), TaskMatch::Missing),
                "{} should not match",
                query
            );
        }
        assert!(matches!(store.find_task_by_prefix("").unwrap(), TaskMatch::Missing));
    }

    #[test]
    fn test_shared_prefix_is_ambiguous() {
        let store = TaskStore::open_in_memory().unwrap();
        for (id, title) in [("abc-1", "First"), ("abc-2", "Second")] {
            let mut task = sample_task(&store, title);
            task.task_id = id.to_string();
            store.put_task(&task).unwrap();
        }

        assert!(matches!(store.find_task_by_prefix("abc").unwrap(), TaskMatch::Ambiguous));
        let exact = store.find_task_by_prefix("abc-2").unwrap().found().unwrap();
        assert_eq!(exact.title, "Second");
    }
}
