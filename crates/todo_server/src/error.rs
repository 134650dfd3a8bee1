//! HTTP error mapping.
//!
//! | Service outcome | Status |
//! |---|---|
//! | `InvalidInput` | 400 |
//! | `NotFound` | 404 |
//! | `StoreUnavailable` / join failure | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use todo_core::{Envelope, ServiceError};

/// Which endpoint produced a response; selects the envelope messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn success_message(self) -> &'static str {
        match self {
            Self::List => "Todos fetched",
            Self::Create => "Todo created",
            Self::Update => "Todo updated",
            Self::Delete => "Todo deleted",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Error fetching todos",
            Self::Create => "Error creating todo",
            Self::Update => "Error updating todo",
            Self::Delete => "Error deleting todo",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Error response rendered as a failure [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: String,
}

impl ApiError {
    pub fn invalid_input(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid todo input".to_string(),
            error: error.into(),
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Todo not found".to_string(),
            error: error.into(),
        }
    }

    pub fn internal(operation: Operation, error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: operation.failure_message().to_string(),
            error: error.into(),
        }
    }

    /// Maps a service failure for `operation` to its HTTP shape.
    pub fn from_service(operation: Operation, err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(reason) => Self::invalid_input(reason.to_string()),
            ServiceError::NotFound(id) => Self::not_found(format!("no todo with id {id}")),
            ServiceError::StoreUnavailable(cause) => {
                error!(
                    "event=http_store_failure module=server status=error operation={} error={}",
                    operation.name(),
                    cause
                );
                Self::internal(operation, "task store unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope::failure(self.message, self.error);
        (self.status, Json(body)).into_response()
    }
}
