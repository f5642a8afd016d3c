//! Bounded retry with exponential backoff and a per-attempt timeout for external calls.

use backon::{ExponentialBuilder, Retryable};
use deckgen_common::DeckConfig;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Errors that can tell whether a retry could help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for deckgen_genai::GenAiError {
    fn is_transient(&self) -> bool {
        deckgen_genai::GenAiError::is_transient(self)
    }
}

impl Transient for deckgen_web_search::SearchError {
    fn is_transient(&self) -> bool {
        deckgen_web_search::SearchError::is_transient(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: usize,
    pub min_delay: Duration,
    /// Upper bound for a single attempt.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DeckConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            min_delay: Duration::from_millis(500),
            timeout: config.request_timeout(),
        }
    }

    /// A single attempt, no backoff.
    pub fn once(timeout: Duration) -> Self {
        Self {
            max_retries: 0,
            min_delay: Duration::ZERO,
            timeout,
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.min_delay.saturating_mul(8).max(self.min_delay))
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of a failed call after the retry budget is spent.
#[derive(Debug)]
pub enum CallError<E> {
    Failed(E),
    TimedOut(Duration),
}

impl<E: Transient> Transient for CallError<E> {
    fn is_transient(&self) -> bool {
        match self {
            CallError::Failed(e) => e.is_transient(),
            CallError::TimedOut(_) => true,
        }
    }
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Failed(e) => write!(f, "{e}"),
            CallError::TimedOut(d) => write!(f, "timed out after {}s", d.as_secs_f64()),
        }
    }
}

/// Run `op` under `policy`, retrying transient failures and attempt timeouts.
pub async fn call_with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, CallError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + fmt::Display,
{
    let timeout = policy.timeout;
    let attempt = || {
        let fut = op();
        async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(CallError::Failed(e)),
                Err(_) => Err(CallError::TimedOut(timeout)),
            }
        }
    };

    attempt
        .retry(policy.backoff())
        .when(|e: &CallError<E>| e.is_transient())
        .notify(|err: &CallError<E>, dur: Duration| {
            tracing::warn!(
                "{label} failed, retrying after {:.2}s: {err}",
                dur.as_secs_f64()
            );
        })
        .await
}
