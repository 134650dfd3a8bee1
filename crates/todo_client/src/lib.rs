//! Client for the todo REST service.
//!
//! [`TaskClient`] keeps a local cache of the task list and applies every
//! mutation optimistically, reconciling with the server through a
//! [`TodoApi`] implementation.

pub mod api;
pub mod sync;

pub use api::{ApiResult, ClientError, HttpTodoApi, TodoApi, DEFAULT_API_URL};
pub use sync::{EditState, LocalTask, Notice, NoticeKind, PendingMutation, SyncState, TaskClient};
