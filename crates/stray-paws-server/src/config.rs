use serde::Serialize;
use std::time::Duration;
use stray_paws_store::RetryPolicy;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub readiness_requires_store: bool,
    pub lookup_retry_attempts: usize,
    pub lookup_retry_backoff_ms: u64,
    #[serde(skip)]
    pub slow_request_threshold: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
            readiness_requires_store: true,
            lookup_retry_attempts: 4,
            lookup_retry_backoff_ms: 120,
            slow_request_threshold: Duration::from_millis(500),
        }
    }
}

impl ApiConfig {
    /// Retry policy for read-only catalog lookups. Writes are never retried.
    #[must_use]
    pub fn lookup_retry(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.lookup_retry_attempts,
            base_backoff_ms: self.lookup_retry_backoff_ms,
        }
    }
}
