//! Connectivity badge derived from the health query.

use todo_core::HealthStatus;

use crate::queries::QueryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Checking,
    Offline,
    Online,
    Issues,
}

impl ConnectionStatus {
    /// Direct mapping: in flight is checking, failure is offline, `UP` is
    /// online, any other reported status is issues.
    pub fn from_query(state: &QueryState<HealthStatus>) -> Self {
        match state {
            QueryState::Idle | QueryState::Loading => ConnectionStatus::Checking,
            QueryState::Error(_) => ConnectionStatus::Offline,
            QueryState::Success(health) if health.is_up() => ConnectionStatus::Online,
            QueryState::Success(_) => ConnectionStatus::Issues,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "API Checking...",
            ConnectionStatus::Offline => "API Disconnected",
            ConnectionStatus::Online => "API Connected",
            ConnectionStatus::Issues => "API Issues",
        }
    }

    fn dot(self) -> char {
        match self {
            ConnectionStatus::Checking => '…',
            ConnectionStatus::Offline => '✗',
            ConnectionStatus::Online => '●',
            ConnectionStatus::Issues => '!',
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthIndicator {
    status: ConnectionStatus,
}

impl Default for HealthIndicator {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Checking,
        }
    }
}

impl HealthIndicator {
    pub fn update(&mut self, state: &QueryState<HealthStatus>) {
        self.status = ConnectionStatus::from_query(state);
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn render(&self) -> String {
        format!("({}) {}", self.status.dot(), self.status.label())
    }
}
