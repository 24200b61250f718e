use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct TodoRequest {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: NaiveDateTime,
    pub status_code: u16,
}

impl<T> ApiResponse<T> {
    /// The body always says 200, whatever the HTTP status (201 on create).
    fn success(data: Option<T>, message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            error: None,
            data,
            timestamp: now(),
            status_code: StatusCode::OK.as_u16(),
        }
    }

    fn error(error: &str, status: StatusCode) -> Self {
        Self {
            message: None,
            error: Some(error.to_string()),
            data: None,
            timestamp: now(),
            status_code: status.as_u16(),
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    pub completed: Option<bool>,
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

/// Shared server state. Cloning shares the underlying store.
///
/// Todos are kept in creation order, so listing newest-first is a reverse
/// walk and stays deterministic when two todos share a timestamp.
#[derive(Clone, Default)]
pub struct ServerState {
    todos: Arc<RwLock<Vec<Todo>>>,
    health: Arc<RwLock<Option<String>>>,
}

impl ServerState {
    /// Override the status reported by `/actuator/health` (default `UP`).
    pub async fn set_health(&self, status: &str) {
        *self.health.write().await = Some(status.to_string());
    }
}

pub fn app() -> Router {
    app_with_state(ServerState::default())
}

pub fn app_with_state(state: ServerState) -> Router {
    let api = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo));
    Router::new()
        .nest("/api", api)
        .route("/actuator/health", get(health))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: ServerState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn not_found<T>() -> Reply<T> {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("Todo not found", StatusCode::NOT_FOUND)))
}

fn blank_title<T>() -> Reply<T> {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error("Title is required", StatusCode::BAD_REQUEST)),
    )
}

async fn list_todos(State(state): State<ServerState>, Query(params): Query<ListParams>) -> Reply<Vec<Todo>> {
    let todos = state.todos.read().await;
    let list: Vec<Todo> = todos
        .iter()
        .rev()
        .filter(|todo| params.completed.map_or(true, |c| todo.completed == c))
        .cloned()
        .collect();
    tracing::debug!(count = list.len(), filter = ?params.completed, "list todos");
    (
        StatusCode::OK,
        Json(ApiResponse::success(Some(list), "Todos retrieved successfully")),
    )
}

async fn create_todo(State(state): State<ServerState>, Json(input): Json<TodoRequest>) -> Reply<Todo> {
    if input.title.trim().is_empty() {
        return blank_title();
    }
    let now = now();
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        completed: input.completed.unwrap_or(false),
        created_at: now,
        updated_at: now,
    };
    state.todos.write().await.push(todo.clone());
    tracing::info!(id = %todo.id, "created todo");
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(todo), "Todo created successfully")),
    )
}

async fn get_todo(State(state): State<ServerState>, Path(id): Path<String>) -> Reply<Todo> {
    let todos = state.todos.read().await;
    match todos.iter().find(|todo| todo.id == id) {
        Some(todo) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(todo.clone()), "Todo retrieved successfully")),
        ),
        None => not_found(),
    }
}

async fn update_todo(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<TodoRequest>,
) -> Reply<Todo> {
    if input.title.trim().is_empty() {
        return blank_title();
    }
    let mut todos = state.todos.write().await;
    let Some(todo) = todos.iter_mut().find(|todo| todo.id == id) else {
        return not_found();
    };
    todo.title = input.title;
    todo.description = input.description;
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.updated_at = now();
    tracing::info!(id = %todo.id, completed = todo.completed, "updated todo");
    (
        StatusCode::OK,
        Json(ApiResponse::success(Some(todo.clone()), "Todo updated successfully")),
    )
}

async fn delete_todo(State(state): State<ServerState>, Path(id): Path<String>) -> Reply<()> {
    let mut todos = state.todos.write().await;
    match todos.iter().position(|todo| todo.id == id) {
        Some(index) => {
            todos.remove(index);
            tracing::info!(%id, "deleted todo");
            (
                StatusCode::OK,
                Json(ApiResponse::success(None, "Todo deleted successfully")),
            )
        }
        None => not_found(),
    }
}

async fn health(State(state): State<ServerState>) -> (StatusCode, Json<serde_json::Value>) {
    let status = state.health.read().await.clone().unwrap_or_else(|| "UP".to_string());
    let code = if status == "DOWN" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let body = json!({
        "status": status,
        "components": {
            "mongo": { "status": status },
            "ping": { "status": "UP" }
        }
    });
    (code, Json(body))
}
