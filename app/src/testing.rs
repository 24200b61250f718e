//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use todo_core::{HttpRequest, HttpResponse};

use crate::api::TodoApi;
use crate::cache::QueryCache;
use crate::error::TransportError;
use crate::queries::TodoQueries;
use crate::transport::Transport;

/// Answers requests from a queue of canned responses and records every
/// request it sees. An empty queue answers with a connection error.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    pub(crate) fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Connect(message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("connection refused".to_string())))
    }
}

pub(crate) fn todo_json(id: &str, title: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "completed": completed,
        "createdAt": "2025-01-01T10:00:00",
        "updatedAt": "2025-01-01T10:00:00"
    })
}

pub(crate) fn envelope(data: Value) -> Value {
    json!({ "message": "ok", "data": data, "statusCode": 200 })
}

pub(crate) fn api(transport: Arc<ScriptedTransport>) -> TodoApi {
    TodoApi::new("http://test/api", "http://test", transport)
}

pub(crate) fn queries(transport: Arc<ScriptedTransport>) -> TodoQueries {
    TodoQueries::new(api(transport), Arc::new(QueryCache::new()))
}
