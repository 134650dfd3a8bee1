//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its partial-update shape.
//! - Normalize and validate user-provided task text.
//!
//! # Invariants
//! - `id` is assigned once by the store and never reused.
//! - `task` is trimmed and non-empty whenever it reaches persistence.
//! - A new task always starts with `completed = false`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier for a task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier. Accepts `_id` from document-style payloads.
    #[serde(alias = "_id")]
    pub id: TaskId,
    /// Trimmed, non-empty description.
    pub task: String,
    pub completed: bool,
}

impl Task {
    /// Builds a fresh, not-yet-completed task with a generated ID.
    ///
    /// The text is stored as given; callers validate with
    /// [`normalize_task_text`] first.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            completed: false,
        }
    }

    /// Applies the supplied fields of `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(text) = &patch.task {
            self.task.clone_from(text);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Partial update for an existing task.
///
/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only changes the completion flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            task: None,
            completed: Some(completed),
        }
    }

    /// Patch that only changes the text.
    pub fn text(task: impl Into<String>) -> Self {
        Self {
            task: Some(task.into()),
            completed: None,
        }
    }

    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.task.is_none() && self.completed.is_none()
    }

    /// Validates the patch and returns a copy with normalized text.
    ///
    /// # Errors
    /// - [`TaskValidationError::EmptyPatch`] when no field is supplied.
    /// - [`TaskValidationError::BlankText`] when `task` is blank after trim.
    pub fn normalized(&self) -> Result<Self, TaskValidationError> {
        if self.is_empty() {
            return Err(TaskValidationError::EmptyPatch);
        }
        let task = self.task.as_deref().map(normalize_task_text).transpose()?;
        Ok(Self {
            task,
            completed: self.completed,
        })
    }
}

/// Validation failures for task input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task text is required")]
    MissingText,
    #[error("task text must not be blank")]
    BlankText,
    #[error("update must contain at least one of `task` or `completed`")]
    EmptyPatch,
}

/// Trims `raw` and rejects blank input.
pub fn normalize_task_text(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::BlankText);
    }
    Ok(trimmed.to_string())
}
