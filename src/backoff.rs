//! Retries operations that fail with transient errors using exponential backoff.
//!
//! Every remote call in the crate goes through [execute]. There is no jitter
//! and no circuit breaker, a failed attempt simply waits twice as long as the
//! previous one before trying again.

use std::{fmt::Display, future::Future, time::Duration};

use crate::Error;

/// Errors that can tell whether the operation that produced them is worth retrying.
pub trait Transient {
    /// Returns `true` for network/timeout class failures.
    fn is_transient(&self) -> bool;
}

impl Transient for Error {
    fn is_transient(&self) -> bool {
        Error::is_transient(self)
    }
}

/// How many times to try a remote call and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The total number of attempts, including the final unprotected attempt.
    pub max_attempts: u32,
    /// The delay after the first failed attempt. Each later delay doubles.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` under this policy, see [execute].
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + Display,
    {
        execute(self.max_attempts, self.initial_delay, operation).await
    }
}

/// Run `operation`, retrying it while it fails with a transient error.
///
/// After the `n`th failed attempt (counting from zero) the executor sleeps for
/// `initial_delay * 2^n`. Up to `max_attempts - 1` attempts are protected this
/// way, then a final attempt is made and its result is returned as-is.
/// Non-transient errors are returned immediately without sleeping.
///
/// A `max_attempts` of zero behaves like one: the operation always runs at
/// least once.
pub async fn execute<T, E, F, Fut>(
    max_attempts: u32,
    initial_delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    for attempt in 0..max_attempts.saturating_sub(1) {
        match operation().await {
            Err(error) if error.is_transient() => {
                let delay = backoff_delay(initial_delay, attempt);
                tracing::warn!(
                    "Attempt {} of {max_attempts} failed with a transient error, retrying in {delay:?}: {error}",
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }

    operation().await
}

fn backoff_delay(initial_delay: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);

    initial_delay.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use std::{
        fmt::Display,
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use tokio::time::Instant;

    use super::{RetryPolicy, Transient, backoff_delay, execute};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Timeout,
        Unauthorized,
    }

    impl Transient for TestError {
        fn is_transient(&self) -> bool {
            *self == TestError::Timeout
        }
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    const INITIAL_DELAY: Duration = Duration::from_millis(1000);

    #[test]
    fn default_policy_is_three_attempts_starting_at_one_second() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(1000));
    }

    #[test]
    fn delay_doubles_for_each_attempt() {
        assert_eq!(backoff_delay(INITIAL_DELAY, 0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(INITIAL_DELAY, 1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(INITIAL_DELAY, 2), Duration::from_millis(4000));
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let largest = backoff_delay(INITIAL_DELAY, 31);

        assert_eq!(backoff_delay(INITIAL_DELAY, 64), INITIAL_DELAY * u32::MAX);
        assert!(backoff_delay(INITIAL_DELAY, 64) > largest);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_success_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result = execute(3, INITIAL_DELAY, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(TestError::Timeout)
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(1000 + 2000));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_only_for_the_attempts_that_failed() {
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result = execute(5, Duration::from_millis(250), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 1 {
                    Err(TestError::Timeout)
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_final_attempt_error_when_retries_run_out() {
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), TestError> = execute(3, INITIAL_DELAY, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Timeout) }
        })
        .await;

        assert_eq!(result, Err(TestError::Timeout));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_returns_on_first_attempt_without_delay() {
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), TestError> = execute(3, INITIAL_DELAY, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Unauthorized) }
        })
        .await;

        assert_eq!(result, Err(TestError::Unauthorized));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, TestError> = execute(0, INITIAL_DELAY, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move { Ok(attempt) }
        })
        .await;

        assert_eq!(result, Ok(0));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn policy_run_uses_its_settings() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(10),
        };
        let start = Instant::now();

        let result: Result<(), TestError> = policy
            .run(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Timeout) }
            })
            .await;

        assert_eq!(result, Err(TestError::Timeout));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(10));
    }
}
