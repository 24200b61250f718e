//! Client configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::health::HealthPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the todo API, e.g. `http://localhost:8080/api`.
    #[serde(default = "default_api_url")]
    pub todo_api_url: String,

    /// Origin serving `/actuator/health`.
    #[serde(default = "default_health_url")]
    pub todo_health_url: String,

    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,

    /// Retries after the first failed health probe.
    #[serde(default = "default_health_retries")]
    pub health_retries: u32,

    #[serde(default = "default_health_retry_delay")]
    pub health_retry_delay_ms: u64,

    #[serde(default = "default_health_timeout")]
    pub health_timeout_ms: u64,

    /// Deadline for todo requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_health_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_health_interval() -> u64 {
    30
}

fn default_health_retries() -> u32 {
    3
}

fn default_health_retry_delay() -> u64 {
    1000
}

fn default_health_timeout() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            todo_api_url: default_api_url(),
            todo_health_url: default_health_url(),
            health_interval_secs: default_health_interval(),
            health_retries: default_health_retries(),
            health_retry_delay_ms: default_health_retry_delay(),
            health_timeout_ms: default_health_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.todo_api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("TODO_API_URL must not be empty".to_string()));
        }
        if self.todo_health_url.trim().is_empty() {
            return Err(ConfigError::Invalid("TODO_HEALTH_URL must not be empty".to_string()));
        }
        if self.health_interval_secs == 0 {
            return Err(ConfigError::Invalid("HEALTH_INTERVAL_SECS must be positive".to_string()));
        }
        Ok(())
    }

    pub fn health_policy(&self) -> HealthPolicy {
        HealthPolicy {
            interval: Duration::from_secs(self.health_interval_secs),
            retries: self.health_retries,
            retry_delay: Duration::from_millis(self.health_retry_delay_ms),
            timeout: Duration::from_millis(self.health_timeout_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
