use std::time::Duration;

use tracing::{info, warn};

use crate::config::RetryConfig;

use super::{AgentTask, AgentTranscript, BrowserAgent, BrowserHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::ZERO,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// Result of a bounded run. `result` is `None` once every attempt failed.
#[derive(Debug, Clone, Default)]
pub struct RetryOutcome {
    pub result: Option<AgentTranscript>,
    pub attempts: u32,
    pub errors: Vec<String>,
}

impl RetryOutcome {
    /// Last error seen, or a generic message.
    pub fn failure_reason(&self) -> String {
        match self.errors.last() {
            Some(last) => format!(
                "browser agent failed after {} attempts: {}",
                self.attempts, last
            ),
            None => format!("browser agent failed after {} attempts", self.attempts),
        }
    }
}

/// Runs `task` until one attempt succeeds or the policy is exhausted.
///
/// The session behind `handle` stays locked for the whole run. Never
/// returns an error; callers check `RetryOutcome::result`.
pub async fn run_with_retry(
    agent: &dyn BrowserAgent,
    task: &AgentTask,
    handle: &BrowserHandle,
    policy: &RetryPolicy,
) -> RetryOutcome {
    let session = handle.lock().await;
    let max_attempts = policy.max_attempts.max(1);
    let mut outcome = RetryOutcome::default();

    for attempt in 1..=max_attempts {
        if attempt > 1 && !policy.backoff.is_zero() {
            tokio::time::sleep(policy.backoff).await;
        }
        outcome.attempts = attempt;

        match agent.run(task, &session).await {
            Ok(transcript) => {
                if attempt > 1 {
                    info!(attempt, "Browser agent succeeded after retry");
                }
                outcome.result = Some(transcript);
                return outcome;
            }
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "Browser agent attempt failed");
                outcome.errors.push(e.to_string());
            }
        }
    }

    warn!(max_attempts, "Browser agent gave up");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{AgentError, BrowserSession};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    struct FlakyAgent {
        calls: AtomicU32,
        failures_before_success: u32,
    }

    #[async_trait]
    impl BrowserAgent for FlakyAgent {
        async fn run(
            &self,
            _task: &AgentTask,
            _session: &BrowserSession,
        ) -> Result<AgentTranscript, AgentError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures_before_success {
                Err(AgentError::TaskFailed(format!("boom {}", call)))
            } else {
                Ok(AgentTranscript {
                    final_result: Some("ok".to_string()),
                    ..AgentTranscript::default()
                })
            }
        }
    }

    fn flaky(failures: u32) -> FlakyAgent {
        FlakyAgent {
            calls: AtomicU32::new(0),
            failures_before_success: failures,
        }
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let agent = flaky(2);
        let handle = BrowserSession::new().into_handle();
        let outcome = run_with_retry(
            &agent,
            &AgentTask::new("t", "m"),
            &handle,
            &RetryPolicy::default(),
        )
        .await;

        assert_eq!(agent.calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.result.unwrap().final_result.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_exhaustion_returns_none() {
        let agent = flaky(u32::MAX);
        let handle = BrowserSession::new().into_handle();
        let outcome = run_with_retry(
            &agent,
            &AgentTask::new("t", "m"),
            &handle,
            &RetryPolicy::default(),
        )
        .await;

        assert!(outcome.result.is_none());
        assert_eq!(agent.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            outcome.errors,
            vec![
                "agent task failed: boom 1",
                "agent task failed: boom 2",
                "agent task failed: boom 3",
            ]
        );
        assert!(outcome.failure_reason().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let agent = flaky(0);
        let handle = BrowserSession::new().into_handle();
        let policy = RetryPolicy {
            max_attempts: 0,
            backoff: Duration::ZERO,
        };
        let outcome = run_with_retry(&agent, &AgentTask::new("t", "m"), &handle, &policy).await;
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_between_attempts() {
        let agent = flaky(1);
        let handle = BrowserSession::new().into_handle();
        let policy = RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_secs(5),
        };
        let start = tokio::time::Instant::now();
        let outcome = run_with_retry(&agent, &AgentTask::new("t", "m"), &handle, &policy).await;
        assert!(outcome.result.is_some());
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_handle_released_after_run() {
        let agent = flaky(0);
        let handle = BrowserSession::new().into_handle();
        run_with_retry(
            &agent,
            &AgentTask::new("t", "m"),
            &handle,
            &RetryPolicy::default(),
        )
        .await;
        assert!(handle.try_lock().is_ok());
    }

    /// Records when each run enters and leaves the agent.
    #[derive(Default)]
    struct RecordingAgent {
        log: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl BrowserAgent for RecordingAgent {
        async fn run(
            &self,
            task: &AgentTask,
            _session: &BrowserSession,
        ) -> Result<AgentTranscript, AgentError> {
            self.log.lock().unwrap().push(format!("enter {}", task.task));
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.log.lock().unwrap().push(format!("exit {}", task.task));
            Ok(AgentTranscript::default())
        }
    }

    #[tokio::test]
    async fn test_runs_on_shared_handle_take_turns() {
        let agent = RecordingAgent::default();
        let handle = BrowserSession::new().into_handle();
        let policy = RetryPolicy::default();
        let first = AgentTask::new("a", "m");
        let second = AgentTask::new("b", "m");

        let (a, b) = tokio::join!(
            run_with_retry(&agent, &first, &handle, &policy),
            run_with_retry(&agent, &second, &handle, &policy),
        );
        assert!(a.result.is_some() && b.result.is_some());

        let log = agent.log.lock().unwrap().clone();
        assert_eq!(log.len(), 4);
        for pair in log.chunks(2) {
            let task = pair[0].strip_prefix("enter ").unwrap();
            assert_eq!(pair[1], format!("exit {}", task), "runs overlapped: {:?}", log);
        }
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_attempts: 5,
            backoff_ms: 250,
        });
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Duration::from_millis(250));
    }
}
