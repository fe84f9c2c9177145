//! Bounded retry around a single model invocation.
//!
//! One bad item must never abort a multi-hour batch run, so exhaustion is
//! reported as a value (`Outcome::Failed`), never as an error. The sentinel
//! string that ends up in the output file is chosen by the caller at the
//! storage boundary; nothing in memory is stringly-typed.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::Config;
use crate::error::AdapterError;

/// Retry knobs for one stage.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Attempts per call, including the first. Must be at least 1.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff(),
        }
    }
}

/// Terminal result of a retried invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The model produced non-empty text.
    Completed(String),
    /// All attempts were used up.
    Failed,
}

impl Outcome {
    /// Serialize to the value stored in the output file, mapping `Failed`
    /// to the stage's sentinel string.
    pub fn into_cell(self, sentinel: &str) -> String {
        match self {
            Outcome::Completed(text) => text,
            Outcome::Failed => sentinel.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed)
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping `policy.backoff`
/// between attempts.
///
/// A successful call that yields empty or whitespace-only text counts as
/// a failure and is retried: an empty answer is as useless to the batch as
/// a transport error, even though the provider reported success.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, mut op: F) -> Outcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, AdapterError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(text) if !text.trim().is_empty() => return Outcome::Completed(text),
            Ok(_) => {
                warn!("empty response on attempt {}/{}, retrying", attempt, max_attempts);
            }
            Err(e) => {
                warn!("attempt {}/{} failed: {}", attempt, max_attempts, e);
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.backoff).await;
        }
    }

    Outcome::Failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    fn stub_error() -> AdapterError {
        AdapterError::EmptyResponse {
            model: "test-model".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = Cell::new(0u32);
        let outcome = with_retry(&fast_policy(3), || {
            calls.set(calls.get() + 1);
            async { Ok("answer".to_string()) }
        })
        .await;

        assert_eq!(outcome, Outcome::Completed("answer".to_string()));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn recovers_after_k_failures() {
        let calls = Cell::new(0u32);
        let outcome = with_retry(&fast_policy(3), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n <= 2 {
                    Err(stub_error())
                } else {
                    Ok("late answer".to_string())
                }
            }
        })
        .await;

        assert_eq!(outcome, Outcome::Completed("late answer".to_string()));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn exhaustion_returns_failed_without_raising() {
        let calls = Cell::new(0u32);
        let outcome = with_retry(&fast_policy(3), || {
            calls.set(calls.get() + 1);
            async { Err(stub_error()) }
        })
        .await;

        assert!(outcome.is_failed());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn empty_text_counts_as_failure() {
        let calls = Cell::new(0u32);
        let outcome = with_retry(&fast_policy(3), || {
            calls.set(calls.get() + 1);
            async { Ok("   \n".to_string()) }
        })
        .await;

        assert!(outcome.is_failed());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_k_failures_sleeps_exactly_k_times() {
        // Under a paused clock, virtual time only advances inside sleeps,
        // so elapsed time is a direct count of backoff pauses.
        let backoff = Duration::from_secs(5);
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff,
        };

        let calls = Cell::new(0u32);
        let started = tokio::time::Instant::now();
        let outcome = with_retry(&policy, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n <= 2 {
                    Err(stub_error())
                } else {
                    Ok("answer".to_string())
                }
            }
        })
        .await;

        assert_eq!(outcome, Outcome::Completed("answer".to_string()));
        assert_eq!(started.elapsed(), backoff * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_sleeps_max_attempts_minus_one_times() {
        let backoff = Duration::from_secs(5);
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff,
        };

        let started = tokio::time::Instant::now();
        let outcome = with_retry(&policy, || async { Err(stub_error()) }).await;

        assert!(outcome.is_failed());
        // No pause after the final attempt.
        assert_eq!(started.elapsed(), backoff * 2);
    }

    #[test]
    fn failed_maps_to_sentinel_at_storage_boundary() {
        let cell = Outcome::Failed.into_cell("Error: Failed to get response");
        assert_eq!(cell, "Error: Failed to get response");

        let ok = Outcome::Completed("42".to_string()).into_cell("Error: Failed to get response");
        assert_eq!(ok, "42");
    }
}
