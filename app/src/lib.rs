//! Terminal client for the todo service.
//!
//! # Overview
//! Layers an async runtime on top of the sans-IO `todo-core` clients:
//! a `Transport` executes requests, `TodoApi` pairs builders with parsers,
//! `TodoQueries` caches reads and invalidates on writes, and the view
//! models in `views` turn query state into text for the `Shell`.
//!
//! # Design
//! - Reads are cached per `QueryKey`; every successful write marks all list
//!   keys stale and bumps a generation counter that the shell watches.
//! - Health is polled by a separate task and published on a `watch`
//!   channel, independent of the todo queries.
//! - Nothing is updated optimistically; the list always shows what the
//!   server last returned.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod page;
pub mod queries;
pub mod shell;
pub mod transport;
pub mod views;

#[cfg(test)]
mod testing;

pub use api::TodoApi;
pub use cache::{CachedData, QueryCache, QueryKey, QueryScope};
pub use config::Config;
pub use error::{ClientError, ConfigError, TransportError};
pub use health::{check_with_retry, HealthMonitor, HealthPolicy};
pub use page::Page;
pub use queries::{MutationState, QueryState, TodoQueries};
pub use shell::{Command, Shell};
pub use transport::{ReqwestTransport, Transport};
