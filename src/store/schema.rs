//! SQLite schema definition
//!
//! Two tables mirror the task/folder model:
//! - tasks: keyed by task_id, indexed for board, folder and "today" queries
//! - folders: keyed by folder_id, indexed by path
//!
//! `PRAGMA user_version` records whether the seed data was written.

pub const SCHEMA: &str = r#"
-- ============================================
-- FOLDERS
-- ============================================

CREATE TABLE IF NOT EXISTS folders (
    folder_id TEXT PRIMARY KEY,            -- UUID
    created_at DATETIME NOT NULL,
    name TEXT NOT NULL,
    path TEXT NOT NULL,                    -- Display path, currently the name
    parent_folder_id TEXT                  -- Stored only, no hierarchy enforcement
);

-- ============================================
-- TASKS
-- ============================================

CREATE TABLE IF NOT EXISTS tasks (
    task_id TEXT PRIMARY KEY,              -- UUID, immutable
    version INTEGER NOT NULL DEFAULT 1,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'backlog', -- 'backlog', 'doing', 'blocked', 'done'
    priority TEXT NOT NULL DEFAULT 'med',   -- 'low', 'med', 'high'
    tags TEXT NOT NULL DEFAULT '[]',        -- JSON array
    folder_id TEXT NOT NULL,               -- Soft reference, not enforced
    folder_path TEXT NOT NULL,             -- Denormalized from folders.path
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL,
    scheduled_for DATE,                    -- YYYY-MM-DD
    tracked_total_min INTEGER NOT NULL DEFAULT 0
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
CREATE INDEX IF NOT EXISTS idx_tasks_folder ON tasks(folder_id);
CREATE INDEX IF NOT EXISTS idx_tasks_scheduled ON tasks(scheduled_for);
CREATE INDEX IF NOT EXISTS idx_tasks_updated ON tasks(updated_at DESC);

CREATE INDEX IF NOT EXISTS idx_folders_path ON folders(path);
"#;

/// Value of `PRAGMA user_version` once the seed data exists
pub const SEEDED_VERSION: i64 = 1;
