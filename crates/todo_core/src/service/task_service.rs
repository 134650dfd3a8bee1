//! Task CRUD service.
//!
//! # Responsibility
//! - Provide list/create/update/delete entry points for transport layers.
//! - Reject invalid input before touching the store.
//! - Map missing records and store failures to [`ServiceError`].
//!
//! # Invariants
//! - Every mutating call performs exactly one store write.
//! - No caching: each call goes straight to the store.
//! - Store failures never escape as anything other than
//!   [`ServiceError::StoreUnavailable`].

use crate::model::task::{normalize_task_text, Task, TaskId, TaskPatch, TaskValidationError};
use crate::repo::task_store::{StoreError, TaskStore};
use log::{info, warn};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy exposed to transport layers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or blank text, or an empty update.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] TaskValidationError),
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Store could not be reached or returned unusable data.
    #[error("task store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Thin translator between transport requests and a [`TaskStore`].
pub struct TaskService<S: TaskStore> {
    store: S,
}

impl<S: TaskStore> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns every task in store order.
    pub fn list(&self) -> ServiceResult<Vec<Task>> {
        let tasks = self.store.find_all().map_err(|err| {
            warn!("event=task_list module=service status=error error={err}");
            err
        })?;
        info!(
            "event=task_list module=service status=ok count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    /// Creates a task from raw text.
    ///
    /// `None` models a request that omitted the field entirely.
    ///
    /// # Contract
    /// - Text is trimmed; blank text is rejected before any store write.
    /// - The created task starts with `completed = false`.
    pub fn create(&self, text: Option<&str>) -> ServiceResult<Task> {
        let text = text.ok_or(TaskValidationError::MissingText)?;
        let text = normalize_task_text(text)?;
        let task = self.store.insert(&text).map_err(|err| {
            warn!("event=task_create module=service status=error error={err}");
            err
        })?;
        info!(
            "event=task_create module=service status=ok id={} text_len={}",
            task.id,
            task.task.chars().count()
        );
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// # Contract
    /// - Empty patches and blank text are rejected before any store write.
    /// - Unsupplied fields keep their stored values.
    pub fn update(&self, id: TaskId, patch: &TaskPatch) -> ServiceResult<Task> {
        let patch = patch.normalized()?;
        match self.store.update_by_id(id, &patch) {
            Ok(Some(task)) => {
                info!(
                    "event=task_update module=service status=ok id={} text_changed={} completed_changed={}",
                    id,
                    patch.task.is_some(),
                    patch.completed.is_some()
                );
                Ok(task)
            }
            Ok(None) => Err(ServiceError::NotFound(id)),
            Err(err) => {
                warn!("event=task_update module=service status=error id={id} error={err}");
                Err(err.into())
            }
        }
    }

    /// Removes a task and returns the removed record.
    pub fn delete(&self, id: TaskId) -> ServiceResult<Task> {
        match self.store.delete_by_id(id) {
            Ok(Some(task)) => {
                info!("event=task_delete module=service status=ok id={id}");
                Ok(task)
            }
            Ok(None) => Err(ServiceError::NotFound(id)),
            Err(err) => {
                warn!("event=task_delete module=service status=error id={id} error={err}");
                Err(err.into())
            }
        }
    }
}
