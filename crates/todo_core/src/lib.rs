//! Core domain logic for the todo list.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::envelope::Envelope;
pub use model::task::{normalize_task_text, Task, TaskId, TaskPatch, TaskValidationError};
pub use repo::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore};
pub use service::task_service::{ServiceError, ServiceResult, TaskService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
