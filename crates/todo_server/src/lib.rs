//! HTTP surface for the todo list.
//!
//! # Responsibility
//! - Expose `TaskService` as the `/todos` REST resource.
//! - Map service errors to status codes inside a uniform envelope.
//! - Own process-level concerns: configuration, CORS, access logging.

pub mod config;
pub mod error;
pub mod handlers;
pub mod request_log;
pub mod routes;

pub use config::{ConfigError, DatabaseLocation, ServerConfig};
pub use error::{ApiError, Operation};
pub use routes::{create_router, AppState, SharedStore};

use todo_core::db::{open_db, open_db_in_memory, DbError};
use todo_core::{SqliteTaskStore, TaskService};

/// Opens the configured database and wraps it in a ready-to-serve service.
pub fn open_service(location: &DatabaseLocation) -> Result<TaskService<SqliteTaskStore>, DbError> {
    let conn = match location {
        DatabaseLocation::File(path) => open_db(path)?,
        DatabaseLocation::InMemory => open_db_in_memory()?,
    };
    Ok(TaskService::new(SqliteTaskStore::new(conn)))
}
