//! Retry with exponential backoff for sidecar requests.

use banter_types::ModelError;
use rand::Rng;

/// Configuration for retry behavior on transient sidecar errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Initial delay in milliseconds before the first retry.
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds between retries.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_factor: 2.0,
        }
    }
}

/// Returns `true` if the error is transient and the request should be retried.
pub fn is_retryable(error: &ModelError) -> bool {
    matches!(
        error,
        ModelError::RateLimited { .. }
            | ModelError::Overloaded
            | ModelError::Server { .. }
            | ModelError::Network(_)
            | ModelError::Timeout
    )
}

/// Delay in milliseconds before the next retry attempt: exponential
/// backoff `initial_delay_ms * backoff_factor^attempt` with ±25% jitter,
/// clamped to `max_delay_ms`.
pub fn calculate_delay(config: &RetryConfig, attempt: u32) -> u64 {
    let base = config.initial_delay_ms as f64 * config.backoff_factor.powi(attempt as i32);
    let clamped = base.min(config.max_delay_ms as f64);

    let jitter_factor = rand::rng().random_range(0.75..=1.25);
    let jittered = clamped * jitter_factor;

    (jittered as u64).min(config.max_delay_ms)
}
