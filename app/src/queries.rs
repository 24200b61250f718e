//! Queries and mutations over the todo resource.
//!
//! Reads go through the `QueryCache`; writes always hit the server, then
//! invalidate every cached list so the next read re-fetches ground truth.
//! Nothing here is optimistic and nothing retries.

use std::sync::Arc;

use todo_core::{ApiResponse, Todo, TodoRequest};
use tracing::{debug, warn};

use crate::api::TodoApi;
use crate::cache::{CachedData, QueryCache, QueryKey, QueryScope};
use crate::error::ClientError;

/// Lifecycle of a read as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// The query is disabled and was not executed.
    Idle,
    Loading,
    Error(String),
    Success(T),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }
}

/// Lifecycle of a write, held by whichever view issued it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending)
    }

    pub fn from_result<T>(result: &Result<T, ClientError>) -> Self {
        match result {
            Ok(_) => MutationState::Success,
            Err(e) => MutationState::Error(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct TodoQueries {
    api: TodoApi,
    cache: Arc<QueryCache>,
}

impl TodoQueries {
    pub fn new(api: TodoApi, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// The todo list as the server orders it. `None` fetches everything,
    /// `Some(flag)` only todos whose completed flag equals `flag`.
    pub async fn list(&self, completed: Option<bool>) -> QueryState<Vec<Todo>> {
        let key = QueryKey::Todos(completed);
        if let Some(CachedData::Todos(todos)) = self.cache.fresh(&key) {
            return QueryState::Success(todos);
        }

        let started_at = self.cache.generation();
        match self.api.list_todos(completed).await {
            Ok(envelope) => {
                let todos = envelope.into_data_or_default();
                self.cache
                    .store_fetched(key, CachedData::Todos(todos.clone()), started_at);
                QueryState::Success(todos)
            }
            Err(e) => {
                warn!(filter = ?completed, error = %e, "failed to load todos");
                QueryState::Error(e.to_string())
            }
        }
    }

    /// A single todo. Disabled (no request, `Idle`) for a blank id.
    pub async fn todo(&self, id: &str) -> QueryState<Option<Todo>> {
        let id = id.trim();
        if id.is_empty() {
            return QueryState::Idle;
        }
        let key = QueryKey::Todo(id.to_string());
        if let Some(CachedData::Todo(todo)) = self.cache.fresh(&key) {
            return QueryState::Success(todo);
        }

        let started_at = self.cache.generation();
        match self.api.get_todo(id).await {
            Ok(envelope) => {
                self.cache
                    .store_fetched(key, CachedData::Todo(envelope.data.clone()), started_at);
                QueryState::Success(envelope.data)
            }
            Err(e) => {
                warn!(%id, error = %e, "failed to load todo");
                QueryState::Error(e.to_string())
            }
        }
    }

    pub async fn create(&self, input: &TodoRequest) -> Result<ApiResponse<Todo>, ClientError> {
        let envelope = self.api.create_todo(input).await?;
        debug!(title = %input.title, "todo created");
        self.cache.invalidate(&QueryScope::TodoLists);
        Ok(envelope)
    }

    pub async fn update(&self, id: &str, input: &TodoRequest) -> Result<ApiResponse<Todo>, ClientError> {
        let envelope = self.api.update_todo(id, input).await?;
        debug!(%id, "todo updated");
        self.invalidate_after_write(id);
        Ok(envelope)
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse<()>, ClientError> {
        let envelope = self.api.delete_todo(id).await?;
        debug!(%id, "todo deleted");
        self.invalidate_after_write(id);
        Ok(envelope)
    }

    fn invalidate_after_write(&self, id: &str) {
        self.cache.invalidate(&QueryScope::Key(QueryKey::Todo(id.to_string())));
        self.cache.invalidate(&QueryScope::TodoLists);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use todo_core::HttpMethod;

    use super::*;
    use crate::testing::{envelope, queries, todo_json, ScriptedTransport};

    fn request(title: &str) -> TodoRequest {
        TodoRequest {
            title: title.to_string(),
            description: None,
            completed: Some(false),
        }
    }

    #[tokio::test]
    async fn list_unwraps_envelope_and_keeps_server_order() {
        let transport = ScriptedTransport::new();
        transport.respond(
            200,
            envelope(json!([todo_json("2", "Second", true), todo_json("1", "First", false)])),
        );
        let queries = queries(transport.clone());

        let state = queries.list(None).await;

        let todos = state.data().unwrap();
        let ids: Vec<&str> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(transport.requests()[0].path, "http://test/api/todos");
    }

    #[tokio::test]
    async fn list_without_payload_is_empty() {
        let transport = ScriptedTransport::new();
        transport.respond(200, json!({ "message": "ok" }));
        let queries = queries(transport);

        assert_eq!(queries.list(Some(true)).await, QueryState::Success(Vec::new()));
    }

    #[tokio::test]
    async fn list_is_served_from_cache_until_invalidated() {
        let transport = ScriptedTransport::new();
        transport.respond(200, envelope(json!([todo_json("1", "First", false)])));
        let queries = queries(transport.clone());

        queries.list(None).await;
        queries.list(None).await;
        assert_eq!(transport.requests().len(), 1);

        queries.cache().invalidate(&QueryScope::TodoLists);
        transport.respond(200, envelope(json!([])));
        assert_eq!(queries.list(None).await, QueryState::Success(Vec::new()));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn list_filters_use_independent_cache_keys() {
        let transport = ScriptedTransport::new();
        transport.respond(200, envelope(json!([todo_json("1", "Done", true)])));
        transport.respond(200, envelope(json!([todo_json("2", "Open", false)])));
        let queries = queries(transport.clone());

        queries.list(Some(true)).await;
        queries.list(Some(false)).await;

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "http://test/api/todos?completed=true".to_string(),
                "http://test/api/todos?completed=false".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn list_failure_is_error_state() {
        let transport = ScriptedTransport::new();
        transport.fail("connection refused");
        let queries = queries(transport);

        assert!(matches!(queries.list(None).await, QueryState::Error(_)));
    }

    #[tokio::test]
    async fn single_query_is_disabled_for_blank_id() {
        let transport = ScriptedTransport::new();
        let queries = queries(transport.clone());

        assert_eq!(queries.todo("").await, QueryState::Idle);
        assert_eq!(queries.todo("   ").await, QueryState::Idle);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn single_query_fetches_by_id() {
        let transport = ScriptedTransport::new();
        transport.respond(200, envelope(todo_json("7", "Seven", false)));
        let queries = queries(transport.clone());

        let state = queries.todo("7").await;
        assert_eq!(state.data().unwrap().as_ref().unwrap().title, "Seven");
        assert_eq!(transport.requests()[0].path, "http://test/api/todos/7");
    }

    #[tokio::test]
    async fn successful_mutations_invalidate_every_list() {
        let transport = ScriptedTransport::new();
        let queries = queries(transport.clone());
        let mut generation = queries.cache().subscribe();

        transport.respond(201, envelope(todo_json("1", "Buy milk", false)));
        queries.create(&request("Buy milk")).await.unwrap();
        assert!(generation.has_changed().unwrap());
        generation.borrow_and_update();

        transport.respond(200, envelope(todo_json("1", "Buy milk", true)));
        queries.update("1", &request("Buy milk")).await.unwrap();
        assert!(generation.has_changed().unwrap());
        generation.borrow_and_update();

        transport.respond(200, json!({ "message": "Todo deleted successfully" }));
        queries.delete("1").await.unwrap();
        assert!(generation.has_changed().unwrap());

        let methods: Vec<HttpMethod> = transport.requests().into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete]);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cache_untouched() {
        let transport = ScriptedTransport::new();
        transport.respond(200, envelope(json!([todo_json("1", "Buy milk", false)])));
        let queries = queries(transport.clone());
        queries.list(None).await;

        transport.respond(500, json!({ "error": "boom" }));
        let err = queries.create(&request("Other")).await.unwrap_err();

        assert!(err.to_string().contains("boom"));
        assert!(!queries.cache().is_stale(&QueryKey::Todos(None)));
        assert_eq!(queries.cache().generation(), 0);
    }

    #[test]
    fn mutation_state_from_result() {
        let ok: Result<(), ClientError> = Ok(());
        assert_eq!(MutationState::from_result(&ok), MutationState::Success);
        let err: Result<(), ClientError> = Err(ClientError::Timeout(std::time::Duration::from_secs(1)));
        assert!(matches!(MutationState::from_result(&err), MutationState::Error(_)));
    }
}
