//! Bounded retry with a fixed pause between attempts.
//!
//! Fixed rather than exponential backoff: the events being scheduled
//! happen once a day, so if the remote service stays down for the whole
//! retry budget the cycle is abandoned and the daily sweep picks the chat
//! up again tomorrow.

use std::future::Future;
use std::time::Duration;

use sunup_core::Result;

/// Retry policy: up to `max_attempts` tries, sleeping `backoff` between
/// them. Only transient errors are retried; anything else is returned
/// immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds, fails non-transiently, or the attempt
    /// budget is exhausted; in the last case the final error is returned.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= self.max_attempts => {
                    tracing::warn!("{what} failed on final attempt {attempt}: {e}");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        "{what} failed (attempt {attempt}/{})... Sleeping {:?}. ({e})",
                        self.max_attempts,
                        self.backoff
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use sunup_core::SunupError;

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(20));

        let started = tokio::time::Instant::now();
        let calls_in = calls.clone();
        let result = policy
            .run("test op", move || {
                let calls = calls_in.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(SunupError::service("down"))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two failures means two backoff sleeps.
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let calls_in = calls.clone();
        let result: Result<()> = policy
            .run("test op", move || {
                let calls = calls_in.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(SunupError::service("still down"))
                }
            })
            .await;

        assert!(matches!(result, Err(SunupError::Service(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let calls_in = calls.clone();
        let result: Result<()> = policy
            .run("test op", move || {
                let calls = calls_in.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(SunupError::SchedulerClosed)
                }
            })
            .await;

        assert!(matches!(result, Err(SunupError::SchedulerClosed)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
