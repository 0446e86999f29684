use nemgate_common::{NemgateError, NodeDescriptor, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::endpoint_pool::EndpointPool;

/// Which failures the dispatcher retries on another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Every failure is retried until the attempt budget is spent, client
    /// errors such as a malformed query included.
    #[default]
    AllFailures,
    /// Only failures for which [`NemgateError::is_transient`] holds are
    /// retried; anything else is returned as-is after the first attempt.
    TransientOnly,
}

impl RetryPolicy {
    fn should_retry(self, error: &NemgateError) -> bool {
        match self {
            RetryPolicy::AllFailures => true,
            RetryPolicy::TransientOnly => error.is_transient(),
        }
    }
}

/// Retry configuration for the failover dispatcher.
///
/// Between attempts the dispatcher sleeps with exponential backoff; an
/// `initial_backoff_ms` of zero retries immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, the first one included.
    ///
    /// Default: 3
    pub max_attempts: usize,
    /// Wait before the second attempt.
    ///
    /// Default: 50ms
    pub initial_backoff_ms: u64,
    /// Backoff cap.
    ///
    /// Default: 5000ms
    pub max_backoff_ms: u64,
    /// Each retry waits `previous_backoff * multiplier`.
    ///
    /// Default: 2.0
    pub backoff_multiplier: f64,
    pub policy: RetryPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 50,
            max_backoff_ms: 5000,
            backoff_multiplier: 2.0,
            policy: RetryPolicy::AllFailures,
        }
    }
}

impl RetryConfig {
    /// Same attempt budget, no sleeping between attempts.
    pub fn without_backoff(mut self) -> Self {
        self.initial_backoff_ms = 0;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn next_backoff(&self, backoff_ms: u64) -> u64 {
        std::cmp::min(
            (backoff_ms as f64 * self.backoff_multiplier) as u64,
            self.max_backoff_ms,
        )
    }
}

/// Runs one logical request against the pool, moving on to the next node
/// whenever an attempt fails.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    pool: Arc<EndpointPool>,
    config: RetryConfig,
}

impl Dispatcher {
    pub fn new(pool: Arc<EndpointPool>, config: RetryConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &Arc<EndpointPool> {
        &self.pool
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Calls `request_fn` with the next node until it succeeds or the
    /// attempt budget is spent.
    ///
    /// A budget of zero is treated as one attempt.
    ///
    /// # Returns
    /// - `Ok(value)` - first successful attempt
    /// - `Err(NemgateError::RetriesExhausted)` - every attempt failed; carries the last failure
    /// - `Err(e)` - `e` was not retryable under the configured [`RetryPolicy`]
    pub async fn execute<T, F, Fut>(&self, request_fn: F) -> Result<T>
    where
        F: FnMut(NodeDescriptor) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with_attempts(self.config.max_attempts, request_fn).await
    }

    /// Like [`execute`](Self::execute) with a per-call attempt budget.
    pub async fn execute_with_attempts<T, F, Fut>(&self, max_attempts: usize, mut request_fn: F) -> Result<T>
    where
        F: FnMut(NodeDescriptor) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = max_attempts.max(1);
        let mut backoff_ms = self.config.initial_backoff_ms;
        let mut attempt = 0;

        loop {
            let node = self.pool.next();
            attempt += 1;

            let error = match request_fn(node.clone()).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(node = %node, attempt, "request succeeded after failover");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !self.config.policy.should_retry(&error) {
                debug!(node = %node, error = %error, "request failed with non-retryable error");
                return Err(error);
            }

            if attempt >= max_attempts {
                warn!(node = %node, attempts = attempt, error = %error, "all attempts failed");
                return Err(NemgateError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            warn!(
                "request to {} failed (attempt {}/{}): {}, retrying in {}ms",
                node, attempt, max_attempts, error, backoff_ms
            );
            if backoff_ms > 0 {
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            backoff_ms = self.config.next_backoff(backoff_ms);
        }
    }
}
