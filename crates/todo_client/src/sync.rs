//! Client-side task cache with optimistic updates.
//!
//! # Responsibility
//! - Mirror the server's task list and apply user mutations locally before
//!   the server confirms them.
//! - Revert toggles and edits the server rejects; report every failure as a
//!   [`Notice`].
//!
//! # Invariants
//! - The server is authoritative; this list is a cache.
//! - A task is `Pending` while at least one of its mutations is unsettled.
//! - Rollback restores the value captured when the mutation began, even if a
//!   later mutation has changed the task since. Mutations on one task are not
//!   serialized.
//! - Deletes are never rolled back.

use crate::api::{ClientError, TodoApi};
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use todo_core::{normalize_task_text, Task, TaskId, TaskPatch};

/// Whether the local copy of a task matches the last server confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Synced,
    Pending,
}

/// One cached task plus its count of unsettled mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTask {
    pub task: Task,
    in_flight: usize,
}

impl LocalTask {
    fn synced(task: Task) -> Self {
        Self { task, in_flight: 0 }
    }

    pub fn sync_state(&self) -> SyncState {
        if self.in_flight == 0 {
            SyncState::Synced
        } else {
            SyncState::Pending
        }
    }
}

/// Task currently open for editing and the text typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: TaskId,
    pub draft: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoadFailed,
    AddFailed,
    InvalidInput,
    ToggleFailed,
    EditFailed,
    DeleteFailed,
    UnknownTask,
}

/// User-facing report of something that did not take effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rollback {
    Completed(bool),
    /// Text before the edit, and the edit exactly as typed.
    Text { prior: String, attempted: String },
}

/// A local change that has been applied but not yet confirmed.
///
/// Produced by `begin_*` and consumed by [`TaskClient::settle`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an unsettled mutation leaves its task pending forever"]
pub struct PendingMutation {
    id: TaskId,
    patch: TaskPatch,
    rollback: Rollback,
}

/// Owns the cached task list and drives every mutation through `api`.
pub struct TaskClient<A: TodoApi> {
    api: A,
    tasks: Vec<LocalTask>,
    editing: Option<EditState>,
    notices: Vec<Notice>,
}

impl<A: TodoApi> TaskClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            editing: None,
            notices: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[LocalTask] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&LocalTask> {
        self.tasks.iter().find(|local| local.task.id == id)
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Returns and clears accumulated notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replaces the local list with the server's.
    ///
    /// On failure the list is left empty and a notice is recorded.
    pub async fn load(&mut self) -> bool {
        match self.api.list().await {
            Ok(tasks) => {
                debug!(
                    "event=client_load module=client status=ok count={}",
                    tasks.len()
                );
                self.tasks = tasks.into_iter().map(LocalTask::synced).collect();
                true
            }
            Err(err) => {
                self.tasks.clear();
                self.report(NoticeKind::LoadFailed, "Could not load todos", &err);
                false
            }
        }
    }

    /// Creates a task on the server and appends the confirmed record.
    ///
    /// Blank text issues no request. Nothing is added locally until the
    /// server answers.
    pub async fn add(&mut self, text: &str) -> bool {
        let Ok(text) = normalize_task_text(text) else {
            return false;
        };
        match self.api.create(&text).await {
            Ok(task) => {
                debug!("event=client_add module=client status=ok id={}", task.id);
                self.tasks.push(LocalTask::synced(task));
                true
            }
            Err(err) => {
                self.report(NoticeKind::AddFailed, "Could not add todo", &err);
                false
            }
        }
    }

    /// Flips `completed` locally, then asks the server to persist it.
    pub async fn toggle_complete(&mut self, id: TaskId) -> bool {
        match self.begin_toggle(id) {
            Some(mutation) => self.send(mutation).await,
            None => false,
        }
    }

    /// Writes `new_text` locally, then asks the server to persist it.
    ///
    /// Success closes edit mode for the task. Failure restores the old text
    /// and reopens edit mode holding the attempted text.
    pub async fn edit_task(&mut self, id: TaskId, new_text: &str) -> bool {
        match self.begin_edit(id, new_text) {
            Some(mutation) => self.send(mutation).await,
            None => false,
        }
    }

    /// Removes the task locally, then asks the server to delete it.
    ///
    /// A failed delete is reported but the task is not restored.
    pub async fn delete(&mut self, id: TaskId) -> bool {
        let Some(position) = self.position(id) else {
            self.notify_unknown(id);
            return false;
        };
        self.tasks.remove(position);
        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }

        match self.api.delete(id).await {
            Ok(_) => {
                debug!("event=client_delete module=client status=ok id={id}");
                true
            }
            Err(err) => {
                self.report(NoticeKind::DeleteFailed, "Could not delete todo", &err);
                false
            }
        }
    }

    /// Opens edit mode for `id` with its current text as the draft.
    pub fn begin_editing(&mut self, id: TaskId) -> bool {
        let Some(local) = self.get(id) else {
            self.notify_unknown(id);
            return false;
        };
        let draft = local.task.task.clone();
        self.editing = Some(EditState { id, draft });
        true
    }

    /// Replaces the in-progress text. No-op outside edit mode.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.draft = draft.into();
        }
    }

    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    /// Submits the current draft through [`Self::edit_task`].
    pub async fn commit_edit(&mut self) -> bool {
        match self.editing.clone() {
            Some(edit) => self.edit_task(edit.id, &edit.draft).await,
            None => false,
        }
    }

    /// Applies a negated `completed` locally and returns the change to send.
    pub fn begin_toggle(&mut self, id: TaskId) -> Option<PendingMutation> {
        let Some(position) = self.position(id) else {
            self.notify_unknown(id);
            return None;
        };
        let local = &mut self.tasks[position];
        let prior = local.task.completed;
        local.task.completed = !prior;
        local.in_flight += 1;
        Some(PendingMutation {
            id,
            patch: TaskPatch::completed(!prior),
            rollback: Rollback::Completed(prior),
        })
    }

    /// Applies `new_text` locally and returns the change to send.
    ///
    /// Blank text is rejected with an `InvalidInput` notice and edit mode is
    /// left untouched.
    pub fn begin_edit(&mut self, id: TaskId, new_text: &str) -> Option<PendingMutation> {
        let text = match normalize_task_text(new_text) {
            Ok(text) => text,
            Err(err) => {
                self.notices.push(Notice::new(
                    NoticeKind::InvalidInput,
                    format!("Cannot save todo: {err}"),
                ));
                return None;
            }
        };
        let Some(position) = self.position(id) else {
            self.notify_unknown(id);
            return None;
        };
        let local = &mut self.tasks[position];
        let prior = std::mem::replace(&mut local.task.task, text.clone());
        local.in_flight += 1;
        Some(PendingMutation {
            id,
            patch: TaskPatch::text(text),
            rollback: Rollback::Text {
                prior,
                attempted: new_text.to_string(),
            },
        })
    }

    /// Confirms or reverts a mutation given the server's answer.
    ///
    /// Success keeps the optimistic value. Failure restores the value
    /// captured by the matching `begin_*` call. A task deleted in the
    /// meantime is ignored.
    ///
    /// Edit mode never loses a draft: success closes it only while the
    /// draft still matches the confirmed text, and failure reopens it only
    /// when no other task is being edited.
    pub fn settle(&mut self, mutation: PendingMutation, outcome: Result<Task, ClientError>) {
        let PendingMutation {
            id,
            patch,
            rollback,
        } = mutation;
        let Some(position) = self.position(id) else {
            debug!("event=client_settle module=client status=skipped id={id} reason=task_gone");
            return;
        };
        let local = &mut self.tasks[position];
        local.in_flight = local.in_flight.saturating_sub(1);

        match (outcome, rollback) {
            (Ok(_), Rollback::Completed(_)) => {
                debug!("event=client_toggle module=client status=ok id={id}");
            }
            (Ok(_), Rollback::Text { .. }) => {
                debug!("event=client_edit module=client status=ok id={id}");
                let confirmed = patch.task.as_deref().unwrap_or_default();
                if self
                    .editing
                    .as_ref()
                    .is_some_and(|edit| edit.id == id && edit.draft.trim() == confirmed)
                {
                    self.editing = None;
                }
            }
            (Err(err), Rollback::Completed(prior)) => {
                local.task.completed = prior;
                self.report(NoticeKind::ToggleFailed, "Could not update todo", &err);
            }
            (Err(err), Rollback::Text { prior, attempted }) => {
                local.task.task = prior;
                if self.editing.is_none() {
                    self.editing = Some(EditState {
                        id,
                        draft: attempted,
                    });
                }
                self.report(NoticeKind::EditFailed, "Could not save todo", &err);
            }
        }
    }

    async fn send(&mut self, mutation: PendingMutation) -> bool {
        let outcome = self.api.update(mutation.id, &mutation.patch).await;
        let confirmed = outcome.is_ok();
        self.settle(mutation, outcome);
        confirmed
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|local| local.task.id == id)
    }

    fn notify_unknown(&mut self, id: TaskId) {
        self.notices.push(Notice::new(
            NoticeKind::UnknownTask,
            format!("No todo with id {id} in the current list"),
        ));
    }

    fn report(&mut self, kind: NoticeKind, summary: &str, err: &ClientError) {
        warn!("event=client_sync module=client status=error kind={kind:?} error={err}");
        self.notices
            .push(Notice::new(kind, format!("{summary}: {err}")));
    }
}
