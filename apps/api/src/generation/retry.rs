//! Bounded retry for completion calls, modelled as an explicit state machine.
//!
//! `Attempting(1) → … → Attempting(MAX_RETRIES)`, then `Succeeded` or `Failed`.
//! Every attempt is a fresh call; nothing is carried between attempts except the
//! last error, which is reported on exhaustion.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::LlmError;

/// Total attempts per generation request, including the first.
pub const MAX_RETRIES: u32 = 3;
/// Fixed pause between a failed attempt and the next one.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Attempting(u32),
    Succeeded,
    Failed,
}

impl AttemptState {
    pub fn start() -> Self {
        AttemptState::Attempting(1)
    }

    /// Transition taken when the current attempt produced a usable result.
    pub fn on_success(self) -> Self {
        match self {
            AttemptState::Attempting(_) => AttemptState::Succeeded,
            terminal => terminal,
        }
    }

    /// Transition taken when the current attempt failed.
    pub fn on_failure(self, max_attempts: u32) -> Self {
        match self {
            AttemptState::Attempting(n) if n < max_attempts => AttemptState::Attempting(n + 1),
            AttemptState::Attempting(_) => AttemptState::Failed,
            terminal => terminal,
        }
    }
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("LLM call failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: LlmError },
}

/// Retry policy. Production uses `RetryPolicy::default()`; the fields are public so
/// tests can exercise the state machine with other bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Runs `attempt` until it succeeds or the policy is exhausted.
    ///
    /// `attempt` receives the 1-based attempt number. Each call must start a brand-new
    /// remote operation.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut state = AttemptState::start();
        let mut value = None;
        let mut last_error = None;

        while let AttemptState::Attempting(n) = state {
            match attempt(n).await {
                Ok(v) => {
                    if n > 1 {
                        info!("LLM call succeeded on attempt {n}/{max_attempts}");
                    }
                    value = Some(v);
                    state = state.on_success();
                }
                Err(e) => {
                    state = state.on_failure(max_attempts);
                    if state == AttemptState::Failed {
                        warn!("LLM call attempt {n}/{max_attempts} failed: {e}. Giving up.");
                    } else {
                        warn!(
                            "LLM call attempt {n}/{max_attempts} failed: {e}. Retrying after {}ms...",
                            self.delay.as_millis()
                        );
                        tokio::time::sleep(self.delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        match (state, value) {
            (AttemptState::Succeeded, Some(v)) => Ok(v),
            _ => Err(RetryError::Exhausted {
                attempts: max_attempts,
                last: last_error.unwrap_or(LlmError::MissingContent),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_state_machine_walks_attempts_then_fails() {
        let mut state = AttemptState::start();
        assert_eq!(state, AttemptState::Attempting(1));
        state = state.on_failure(3);
        assert_eq!(state, AttemptState::Attempting(2));
        state = state.on_failure(3);
        assert_eq!(state, AttemptState::Attempting(3));
        state = state.on_failure(3);
        assert_eq!(state, AttemptState::Failed);
    }

    #[test]
    fn test_state_machine_success_is_terminal() {
        let state = AttemptState::Attempting(2).on_success();
        assert_eq!(state, AttemptState::Succeeded);
        assert_eq!(state.on_failure(3), AttemptState::Succeeded);
        assert_eq!(AttemptState::Failed.on_success(), AttemptState::Failed);
    }

    #[test]
    fn test_default_policy_is_fixed() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_succeeds_first_try_without_delay() {
        let start = tokio::time::Instant::now();
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::default()
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, LlmError>("ok") }
            })
            .await
            .unwrap();
        assert_eq!(result, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fails_twice_then_succeeds() {
        let start = tokio::time::Instant::now();
        let seen = std::sync::Mutex::new(Vec::new());
        let result = RetryPolicy::default()
            .run(|n| {
                seen.lock().unwrap().push(n);
                async move {
                    if n < 3 {
                        Err(LlmError::MissingContent)
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(result, 3);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(start.elapsed(), RETRY_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhausts_and_reports_last_error() {
        let start = tokio::time::Instant::now();
        let calls = AtomicU32::new(0);
        let err = RetryPolicy::default()
            .run(|n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err::<(), _>(LlmError::Api {
                        status: 500,
                        message: format!("boom {n}"),
                    })
                }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // No sleep after the final attempt.
        assert_eq!(start.elapsed(), RETRY_DELAY * 2);

        let RetryError::Exhausted { attempts, last } = &err;
        assert_eq!(*attempts, 3);
        assert!(matches!(last, LlmError::Api { status: 500, .. }));
        assert!(err.to_string().contains("boom 3"));
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy_bounds_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(10),
        };
        let start = tokio::time::Instant::now();
        let result = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(LlmError::Timeout) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(start.elapsed(), Duration::from_millis(40));
    }
}
