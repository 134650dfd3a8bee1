//! Transport contract for the `/todos` resource and its reqwest implementation.
//!
//! # Invariants
//! - Any non-2xx response is an error; the caller never inspects status codes
//!   to decide whether to roll back.
//! - One method call issues exactly one HTTP request. No retries.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use todo_core::{Envelope, Task, TaskId, TaskPatch};

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/todos";

pub type ApiResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Remote operations the sync layer depends on.
pub trait TodoApi {
    fn list(&self) -> impl Future<Output = ApiResult<Vec<Task>>> + Send;
    fn create(&self, text: &str) -> impl Future<Output = ApiResult<Task>> + Send;
    fn update(
        &self,
        id: TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = ApiResult<Task>> + Send;
    fn delete(&self, id: TaskId) -> impl Future<Output = ApiResult<Task>> + Send;
}

/// reqwest-backed client for a running `todo-server`.
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// `base_url` points at the collection, e.g. `http://localhost:8000/todos`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn item_url(&self, id: TaskId) -> String {
        format!("{}/{id}", self.base_url)
    }
}

#[derive(serde::Serialize)]
struct CreateBody<'a> {
    task: &'a str,
}

impl TodoApi for HttpTodoApi {
    async fn list(&self) -> ApiResult<Vec<Task>> {
        let response = self.client.get(&self.base_url).send().await?;
        parse_response(response).await
    }

    async fn create(&self, text: &str) -> ApiResult<Task> {
        let response = self
            .client
            .post(&self.base_url)
            .json(&CreateBody { task: text })
            .send()
            .await?;
        parse_response(response).await
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiResult<Task> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(patch)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn delete(&self, id: TaskId) -> ApiResult<Task> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = match serde_json::from_slice::<Envelope<serde::de::IgnoredAny>>(&bytes) {
            Ok(envelope) => match envelope.error {
                Some(error) => format!("{} ({error})", envelope.message),
                None => envelope.message,
            },
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: Envelope<T> = serde_json::from_slice(&bytes)
        .map_err(|err| ClientError::MalformedResponse(err.to_string()))?;
    envelope
        .data
        .ok_or_else(|| ClientError::MalformedResponse("response envelope has no data".to_string()))
}
