//! Synchronous API client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `TodoClient` and `HealthClient` are stateless; each holds only a base URL.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Todo endpoints return the `ApiResponse` envelope as-is; the health
//!   endpoint returns a bare `HealthStatus`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod health;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::{ApiError, ValidationError};
pub use health::HealthClient;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{ApiResponse, ComponentHealth, HealthStatus, Todo, TodoRequest};
