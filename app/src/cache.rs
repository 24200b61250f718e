//! Read-through cache shared by every query and mutation.
//!
//! # Design
//! The server is the only source of truth. The cache stores the last result
//! of each query under its `QueryKey` and is never patched locally: a
//! successful mutation marks the affected entries stale and the next read
//! goes back to the server.
//!
//! Every invalidation bumps a generation counter published on a
//! `watch` channel. Views subscribe to it and re-run their queries, which is
//! how a list rendered under one filter picks up a change made under another.
//! A fetch that started before an invalidation is stored as stale, so a slow
//! response can never mask a newer mutation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use todo_core::{HealthStatus, Todo};
use tokio::sync::watch;
use tracing::debug;

/// Identifies one cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// A todo list; `None` is the unfiltered list, `Some(flag)` the list
    /// filtered by completion.
    Todos(Option<bool>),
    Todo(String),
    Health,
}

/// A set of keys to invalidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Every `QueryKey::Todos(_)` entry, whatever its filter.
    TodoLists,
    Key(QueryKey),
}

impl QueryScope {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            QueryScope::TodoLists => matches!(key, QueryKey::Todos(_)),
            QueryScope::Key(k) => k == key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedData {
    Todos(Vec<Todo>),
    Todo(Option<Todo>),
    Health(HealthStatus),
}

#[derive(Debug)]
struct Entry {
    data: CachedData,
    stale: bool,
}

#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    generation: watch::Sender<u64>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            entries: Mutex::new(HashMap::new()),
            generation,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached data for `key`, stale or not.
    pub fn get(&self, key: &QueryKey) -> Option<CachedData> {
        self.entries().get(key).map(|entry| entry.data.clone())
    }

    /// Cached data for `key` only if it has not been invalidated.
    pub fn fresh(&self, key: &QueryKey) -> Option<CachedData> {
        self.entries()
            .get(key)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.data.clone())
    }

    /// A missing entry counts as stale.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries().get(key).map_or(true, |entry| entry.stale)
    }

    pub fn set(&self, key: QueryKey, data: CachedData) {
        self.entries().insert(key, Entry { data, stale: false });
    }

    /// Store a fetch result, marking it stale if any invalidation happened
    /// after the fetch started at `started_at` (a value of `generation()`).
    pub fn store_fetched(&self, key: QueryKey, data: CachedData, started_at: u64) {
        let stale = self.generation() != started_at;
        if stale {
            debug!(?key, "fetch raced an invalidation; storing as stale");
        }
        self.entries().insert(key, Entry { data, stale });
    }

    /// Mark every entry in `scope` stale and notify subscribers. Returns the
    /// number of entries affected.
    pub fn invalidate(&self, scope: &QueryScope) -> usize {
        let mut count = 0;
        for (key, entry) in self.entries().iter_mut() {
            if scope.matches(key) {
                entry.stale = true;
                count += 1;
            }
        }
        self.generation.send_modify(|generation| *generation += 1);
        debug!(?scope, count, generation = self.generation(), "invalidated queries");
        count
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Receiver that changes on every invalidation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}
