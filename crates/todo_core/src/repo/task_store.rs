//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert, find-all, find/update/delete-by-id over `tasks`.
//! - Assign identifiers at insert time.
//!
//! # Invariants
//! - Listing follows insertion order (`seq ASC`).
//! - Identifiers are random v4 UUIDs and are never recycled.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskPatch};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, task, completed";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to reach or read the underlying store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("task store is unavailable: {0}")]
    Unavailable(String),
    #[error("invalid persisted task data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store contract consumed by `TaskService`.
pub trait TaskStore {
    /// Persists a new, not-yet-completed task and returns it with its ID.
    fn insert(&self, text: &str) -> StoreResult<Task>;
    fn find_all(&self) -> StoreResult<Vec<Task>>;
    fn find_by_id(&self, id: TaskId) -> StoreResult<Option<Task>>;
    /// Applies the supplied fields and returns the updated record, or `None`
    /// when no task has `id`.
    fn update_by_id(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<Option<Task>>;
    /// Removes the task and returns the removed record, or `None` when no
    /// task has `id`.
    fn delete_by_id(&self, id: TaskId) -> StoreResult<Option<Task>>;
}

/// SQLite-backed task store.
///
/// The connection sits behind a mutex so one store can be shared across
/// request handlers; each method holds the lock for exactly one statement.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl TaskStore for SqliteTaskStore {
    fn insert(&self, text: &str) -> StoreResult<Task> {
        let task = Task::new(text);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (id, task, completed) VALUES (?1, ?2, ?3);",
            params![task.id.to_string(), task.task.as_str(), task.completed],
        )?;
        debug!("event=task_insert module=store status=ok id={}", task.id);
        Ok(task)
    }

    fn find_all(&self) -> StoreResult<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn find_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_by_id(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<Option<Task>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "UPDATE tasks
                     SET
                        task = COALESCE(?1, task),
                        completed = COALESCE(?2, completed),
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?3
                     RETURNING {TASK_COLUMNS};"
                ),
                params![patch.task.as_deref(), patch.completed, id.to_string()],
                read_raw_row,
            )
            .optional()?;
        row.map(RawTaskRow::into_task).transpose()
    }

    fn delete_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("DELETE FROM tasks WHERE id = ?1 RETURNING {TASK_COLUMNS};"),
                [id.to_string()],
                read_raw_row,
            )
            .optional()?;
        row.map(RawTaskRow::into_task).transpose()
    }
}

struct RawTaskRow {
    id: String,
    task: String,
    completed: i64,
}

impl RawTaskRow {
    fn into_task(self) -> StoreResult<Task> {
        let id = Uuid::parse_str(&self.id).map_err(|_| {
            StoreError::InvalidData(format!("invalid uuid value `{}` in tasks.id", self.id))
        })?;
        let completed = match self.completed {
            0 => false,
            1 => true,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "invalid completed value `{other}` in tasks.completed"
                )));
            }
        };
        Ok(Task {
            id,
            task: self.task,
            completed,
        })
    }
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawTaskRow> {
    Ok(RawTaskRow {
        id: row.get("id")?,
        task: row.get("task")?,
        completed: row.get("completed")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    read_raw_row(row)?.into_task()
}
