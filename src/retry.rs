//! Timeout-bounded dispatch with exponential backoff.
//!
//! [`dispatch_with_retry`] runs a request thunk up to
//! [`RetryPolicy::max_attempts`] times.  Every attempt is bounded by
//! [`RetryPolicy::attempt_timeout`]; running out of time drops the in-flight
//! future and yields [`Error::Timeout`], which is distinct from a connection
//! failure.  Between attempts the dispatcher sleeps `base_delay * 2^(n-1)` and
//! tells its [`RetryObserver`] so the UI can show a transient notice.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUEST_RETRIES, CLIENT_REQUEST_TIMEOUTS,
    CLIENT_REQUESTS, CLIENT_RETRY_BACKOFF,
};

/// Attempts per submission.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubled for each later one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Time budget of a single attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a retry notice stays on screen.
pub const RETRY_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Attempt count, backoff and per-attempt timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Sets the total number of attempts.  Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Delay after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// A transient "retrying" notice for the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryNotice {
    /// The attempt that just failed (1-based).
    pub attempt: u32,
    pub max_attempts: u32,
    /// How long the dispatcher waits before the next attempt.
    pub delay: Duration,
    /// How long the notice should remain visible.
    pub ttl: Duration,
}

/// Hooks invoked by [`dispatch_with_retry`].
pub trait RetryObserver {
    /// Called after every attempt with its outcome.
    fn attempt_finished(&mut self, attempt: u32, outcome: std::result::Result<(), &Error>) {
        let _ = (attempt, outcome);
    }

    /// Called before sleeping ahead of another attempt.
    fn retrying(&mut self, notice: &RetryNotice, error: &Error) {
        let _ = (notice, error);
    }
}

impl RetryObserver for () {}

/// Runs `request` until it succeeds or the policy's attempts are exhausted.
///
/// `request` receives the 1-based attempt number.  On exhaustion the error of
/// the final attempt is returned.
pub async fn dispatch_with_retry<T, F, Fut, O>(
    policy: &RetryPolicy,
    observer: &mut O,
    mut request: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    O: RetryObserver + ?Sized,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let outcome = match tokio::time::timeout(policy.attempt_timeout, request(attempt)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                CLIENT_REQUEST_TIMEOUTS.click();
                Err(Error::timeout(
                    "server may be overloaded",
                    Some(policy.attempt_timeout.as_secs_f64()),
                ))
            }
        };
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let err = match outcome {
            Ok(value) => {
                observer.attempt_finished(attempt, Ok(()));
                return Ok(value);
            }
            Err(err) => err,
        };
        CLIENT_REQUEST_ERRORS.click();
        observer.attempt_finished(attempt, Err(&err));
        log::warn!("attempt {attempt}/{max_attempts} failed: {err}");

        if attempt >= max_attempts {
            return Err(err);
        }

        let delay = policy.backoff(attempt);
        let notice = RetryNotice {
            attempt,
            max_attempts,
            delay,
            ttl: RETRY_NOTICE_TTL,
        };
        observer.retrying(&notice, &err);
        CLIENT_REQUEST_RETRIES.click();
        CLIENT_RETRY_BACKOFF.add(delay.as_secs_f64());
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio_test::{assert_err, assert_ok};

    #[derive(Default)]
    struct Recorder {
        finished: Vec<(u32, bool)>,
        notices: Vec<RetryNotice>,
    }

    impl RetryObserver for Recorder {
        fn attempt_finished(&mut self, attempt: u32, outcome: std::result::Result<(), &Error>) {
            self.finished.push((attempt, outcome.is_ok()));
        }

        fn retrying(&mut self, notice: &RetryNotice, _: &Error) {
            self.notices.push(*notice);
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        let huge = policy.backoff(u32::MAX);
        assert!(huge >= Duration::from_secs(1 << 31));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let mut recorder = Recorder::default();
        let start = tokio::time::Instant::now();
        let result = dispatch_with_retry(&RetryPolicy::new(), &mut recorder, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(Error::connection("refused", None))
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(assert_ok!(result), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert_eq!(recorder.notices.len(), 2);
        assert_eq!(recorder.notices[0].attempt, 1);
        assert_eq!(recorder.notices[0].delay, Duration::from_secs(1));
        assert_eq!(recorder.notices[1].attempt, 2);
        assert_eq!(recorder.notices[1].delay, Duration::from_secs(2));
        assert_eq!(recorder.notices[1].max_attempts, 3);
        assert_eq!(recorder.notices[1].ttl, RETRY_NOTICE_TTL);
        assert_eq!(recorder.finished, vec![(1, false), (2, false), (3, true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let mut recorder = Recorder::default();
        let result: Result<()> = dispatch_with_retry(&RetryPolicy::new(), &mut recorder, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(Error::api(500, format!("failure {attempt}"))) }
        })
        .await;
        let err = assert_err!(result);
        assert_eq!(err.to_string(), "HTTP error 500: failure 3");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(recorder.notices.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempts_time_out() {
        let start = tokio::time::Instant::now();
        let result: Result<&str> = dispatch_with_retry(&RetryPolicy::new(), &mut (), |_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late")
        })
        .await;
        let err = assert_err!(result);
        assert!(err.is_timeout());
        // three 10s attempts plus 1s and 2s of backoff
        assert_eq!(start.elapsed(), Duration::from_secs(33));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_per_attempt() {
        let policy = RetryPolicy::new().with_max_attempts(2);
        let result = dispatch_with_retry(&policy, &mut (), |attempt| async move {
            if attempt == 1 {
                tokio::time::sleep(Duration::from_secs(11)).await;
            } else {
                tokio::time::sleep(Duration::from_secs(9)).await;
            }
            Ok(attempt)
        })
        .await;
        assert_eq!(assert_ok!(result), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_tries_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new().with_max_attempts(0);
        let result: Result<()> = dispatch_with_retry(&policy, &mut (), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::not_found("gone")) }
        })
        .await;
        assert!(assert_err!(result).is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
