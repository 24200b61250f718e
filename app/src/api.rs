//! Async facade over the sans-IO clients.
//!
//! `TodoApi` pairs each `build_*`/`parse_*` couple from `todo-core` with a
//! transport round-trip and a deadline. It does not retry; callers decide.

use std::sync::Arc;
use std::time::Duration;

use todo_core::{
    ApiResponse, HealthClient, HealthStatus, HttpRequest, HttpResponse, Todo, TodoClient,
    TodoRequest,
};
use tracing::debug;

use crate::error::ClientError;
use crate::transport::Transport;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TodoApi {
    todos: TodoClient,
    health: HealthClient,
    transport: Arc<dyn Transport>,
    request_timeout: Duration,
}

impl TodoApi {
    pub fn new(api_url: &str, health_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            todos: TodoClient::new(api_url),
            health: HealthClient::new(health_url),
            transport,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// All todos when `completed` is `None`, otherwise only those whose
    /// flag matches.
    pub async fn list_todos(&self, completed: Option<bool>) -> Result<ApiResponse<Vec<Todo>>, ClientError> {
        let request = match completed {
            Some(completed) => self.todos.build_list_todos_by_status(completed),
            None => self.todos.build_list_todos(),
        };
        let response = self.send(request, self.request_timeout).await?;
        Ok(self.todos.parse_list_todos(response)?)
    }

    pub async fn get_todo(&self, id: &str) -> Result<ApiResponse<Todo>, ClientError> {
        let response = self.send(self.todos.build_get_todo(id), self.request_timeout).await?;
        Ok(self.todos.parse_get_todo(response)?)
    }

    pub async fn create_todo(&self, input: &TodoRequest) -> Result<ApiResponse<Todo>, ClientError> {
        let request = self.todos.build_create_todo(input)?;
        let response = self.send(request, self.request_timeout).await?;
        Ok(self.todos.parse_create_todo(response)?)
    }

    pub async fn update_todo(&self, id: &str, input: &TodoRequest) -> Result<ApiResponse<Todo>, ClientError> {
        let request = self.todos.build_update_todo(id, input)?;
        let response = self.send(request, self.request_timeout).await?;
        Ok(self.todos.parse_update_todo(response)?)
    }

    pub async fn delete_todo(&self, id: &str) -> Result<ApiResponse<()>, ClientError> {
        let response = self.send(self.todos.build_delete_todo(id), self.request_timeout).await?;
        Ok(self.todos.parse_delete_todo(response)?)
    }

    /// One health probe bounded by `timeout`.
    pub async fn health_check(&self, timeout: Duration) -> Result<HealthStatus, ClientError> {
        let response = self.send(self.health.build_health_check(), timeout).await?;
        Ok(self.health.parse_health_check(response)?)
    }

    async fn send(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse, ClientError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        match tokio::time::timeout(timeout, self.transport.execute(request)).await {
            Ok(result) => {
                let response = result?;
                debug!(status = response.status, "received response");
                Ok(response)
            }
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }
}
