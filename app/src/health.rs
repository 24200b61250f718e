//! Background polling of the service health endpoint.
//!
//! The monitor is a tokio task with its own cache key. On every interval
//! tick it runs one health query: a first attempt plus up to `retries`
//! retries spaced by `retry_delay`, each attempt bounded by `timeout`. The
//! settled result is published on a `watch` channel. Mutations never touch
//! it; it only stops when its `CancellationToken` fires.

use std::sync::Arc;
use std::time::Duration;

use todo_core::HealthStatus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::TodoApi;
use crate::cache::{CachedData, QueryCache, QueryKey};
use crate::error::ClientError;
use crate::queries::QueryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub interval: Duration,
    /// Retries after the first failed attempt.
    pub retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            retries: 3,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        }
    }
}

/// One health query with bounded retry.
pub async fn check_with_retry(api: &TodoApi, policy: &HealthPolicy) -> Result<HealthStatus, ClientError> {
    let mut attempt = 0;
    loop {
        match api.health_check(policy.timeout).await {
            Ok(health) => return Ok(health),
            Err(e) if attempt < policy.retries => {
                attempt += 1;
                debug!(attempt, retries = policy.retries, error = %e, "health check failed, retrying");
                sleep(policy.retry_delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

pub struct HealthMonitor {
    state: watch::Receiver<QueryState<HealthStatus>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// Start polling. The published state is `Loading` until the first query
    /// settles; later polls replace it directly without passing through
    /// `Loading` again.
    pub fn spawn(
        api: TodoApi,
        cache: Arc<QueryCache>,
        policy: HealthPolicy,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, state) = watch::channel(QueryState::Loading);
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(policy.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = tokio::select! {
                    _ = token.cancelled() => break,
                    outcome = check_with_retry(&api, &policy) => outcome,
                };

                let next = match outcome {
                    Ok(health) => {
                        debug!(status = %health.status, "health check settled");
                        cache.set(QueryKey::Health, CachedData::Health(health.clone()));
                        QueryState::Success(health)
                    }
                    Err(e) => {
                        warn!(error = %e, "health check failed after retries");
                        QueryState::Error(e.to_string())
                    }
                };
                tx.send_replace(next);
            }
            info!("health monitor stopped");
        });

        Self { state, cancel, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<HealthStatus>> {
        self.state.clone()
    }

    pub fn current(&self) -> QueryState<HealthStatus> {
        self.state.borrow().clone()
    }

    /// Cancel polling and wait for the task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "health monitor task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{api, ScriptedTransport};

    fn policy() -> HealthPolicy {
        HealthPolicy::default()
    }

    #[tokio::test(start_paused = true)]
    async fn retries_three_times_before_giving_up() {
        let transport = ScriptedTransport::new();
        let api = api(transport.clone());

        let result = check_with_retry(&api, &policy()).await;

        assert!(result.is_err());
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_a_later_attempt() {
        let transport = ScriptedTransport::new();
        transport.fail("refused");
        transport.fail("refused");
        transport.respond(200, json!({ "status": "UP" }));
        let api = api(transport.clone());

        let health = check_with_retry(&api, &policy()).await.unwrap();

        assert!(health.is_up());
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(transport.requests()[0].path, "http://test/actuator/health");
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_status_is_retried_then_fails() {
        let transport = ScriptedTransport::new();
        for _ in 0..4 {
            transport.respond(503, json!({ "status": "DOWN" }));
        }
        let api = api(transport.clone());

        let err = check_with_retry(&api, &policy()).await.unwrap_err();

        assert!(matches!(err, ClientError::Api(todo_core::ApiError::Http { status: 503, .. })));
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_starts_loading_then_publishes_success() {
        let transport = ScriptedTransport::new();
        transport.respond(200, json!({ "status": "UP" }));
        let cache = Arc::new(QueryCache::new());
        let monitor = HealthMonitor::spawn(api(transport), cache.clone(), policy(), CancellationToken::new());
        let mut rx = monitor.subscribe();

        assert!(monitor.current().is_loading());
        rx.changed().await.unwrap();

        assert!(matches!(monitor.current(), QueryState::Success(ref h) if h.is_up()));
        assert!(matches!(cache.get(&QueryKey::Health), Some(CachedData::Health(_))));
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_publishes_error_after_exhausting_retries() {
        let transport = ScriptedTransport::new();
        let monitor = HealthMonitor::spawn(
            api(transport.clone()),
            Arc::new(QueryCache::new()),
            policy(),
            CancellationToken::new(),
        );
        let mut rx = monitor.subscribe();

        rx.changed().await.unwrap();

        assert!(matches!(monitor.current(), QueryState::Error(_)));
        assert_eq!(transport.requests().len(), 4);
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_polls_on_interval() {
        let transport = ScriptedTransport::new();
        transport.respond(200, json!({ "status": "UP" }));
        transport.respond(200, json!({ "status": "OUT_OF_SERVICE" }));
        let monitor = HealthMonitor::spawn(
            api(transport.clone()),
            Arc::new(QueryCache::new()),
            policy(),
            CancellationToken::new(),
        );
        let mut rx = monitor.subscribe();

        rx.changed().await.unwrap();
        assert!(matches!(monitor.current(), QueryState::Success(ref h) if h.is_up()));

        rx.changed().await.unwrap();
        assert!(matches!(monitor.current(), QueryState::Success(ref h) if h.status == "OUT_OF_SERVICE"));
        assert_eq!(transport.requests().len(), 2);
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_task() {
        let transport = ScriptedTransport::new();
        let cancel = CancellationToken::new();
        let monitor = HealthMonitor::spawn(
            api(transport),
            Arc::new(QueryCache::new()),
            policy(),
            cancel.clone(),
        );
        cancel.cancel();
        monitor.shutdown().await;
    }
}
