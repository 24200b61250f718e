//! Request builder and parser for the service health endpoint.
//!
//! The health endpoint lives on its own base URL (no `/api` prefix) and its
//! body is not wrapped in an envelope. Like every other endpoint, a non-2xx
//! status is an error even when it carries a health body: a service that
//! answers 503 DOWN is treated as unavailable. Only a 2xx response reporting
//! something other than `UP` counts as "reachable but unhealthy".

use crate::client::check_status;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::HealthStatus;

#[derive(Debug, Clone)]
pub struct HealthClient {
    base_url: String,
}

impl HealthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_health_check(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/actuator/health", self.base_url),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    pub fn parse_health_check(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}
