//! Router assembly.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/` | `root` |
//! | GET | `/todos` | `list_tasks` |
//! | POST | `/todos` | `create_task` |
//! | PUT | `/todos/{id}` | `update_task` |
//! | DELETE | `/todos/{id}` | `delete_task` |

use crate::handlers::{create_task, delete_task, list_tasks, root, update_task};
use crate::request_log::log_requests;
use axum::middleware;
use axum::routing::{get, put};
use axum::Router;
use std::sync::Arc;
use todo_core::{TaskService, TaskStore};
use tower_http::cors::{Any, CorsLayer};

/// Store bound required to share a service across request handlers.
pub trait SharedStore: TaskStore + Send + Sync + 'static {}

impl<S: TaskStore + Send + Sync + 'static> SharedStore for S {}

/// Handler state: one service instance shared by every request.
pub struct AppState<S: SharedStore> {
    pub service: Arc<TaskService<S>>,
}

impl<S: SharedStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

/// Builds the full application router, including CORS and request logging.
pub fn create_router<S: SharedStore>(service: TaskService<S>) -> Router {
    let state = AppState {
        service: Arc::new(service),
    };

    Router::new()
        .route("/", get(root))
        .route("/todos", get(list_tasks::<S>).post(create_task::<S>))
        .route("/todos/{id}", put(update_task::<S>).delete(delete_task::<S>))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
