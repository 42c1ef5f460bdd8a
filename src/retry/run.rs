//! Retry loop: run a closure until success, a non-retryable error, or the
//! attempt budget runs out.

use std::fmt::Display;
use std::time::Duration;

use super::policy::RetryPolicy;

/// Runs `op` under `policy`, sleeping the calling thread between attempts.
///
/// Errors for which `is_retryable` returns false are returned immediately.
/// Once the attempts are used up the last error is returned unchanged.
pub fn run_with_retry<T, E, R, F>(policy: &RetryPolicy, is_retryable: R, op: F) -> Result<T, E>
where
    E: Display,
    R: Fn(&E) -> bool,
    F: FnMut() -> Result<T, E>,
{
    run_with_retry_sleeping(policy, is_retryable, std::thread::sleep, op)
}

/// Same as [`run_with_retry`] with the wait supplied by the caller.
pub fn run_with_retry_sleeping<T, E, R, S, F>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut sleep: S,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    R: Fn(&E) -> bool,
    S: FnMut(Duration),
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 1u32;
    let mut delay = policy.initial_delay();
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !is_retryable(&e) || attempt >= policy.tries() {
                    return Err(e);
                }
                tracing::warn!(
                    "attempt {}/{} failed: {}; retrying in {:.2}s",
                    attempt,
                    policy.tries(),
                    e,
                    delay.as_secs_f64()
                );
                sleep(delay);
                delay = policy.next_delay(delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Flaky(u32),
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn flaky(e: &TestError) -> bool {
        matches!(e, TestError::Flaky(_))
    }

    #[test]
    fn test_permanent_failure_exhausts_tries_with_growing_delays() {
        let policy = RetryPolicy::new(4, Duration::from_millis(10), 3.0).unwrap();
        let calls = Cell::new(0u32);
        let mut slept = Vec::new();

        let result: Result<(), TestError> = run_with_retry_sleeping(
            &policy,
            flaky,
            |d| slept.push(d),
            || {
                calls.set(calls.get() + 1);
                Err(TestError::Flaky(calls.get()))
            },
        );

        assert_eq!(calls.get(), 4);
        // Last error comes back untouched
        assert_eq!(result, Err(TestError::Flaky(4)));
        assert_eq!(slept.len(), 3);
        let expected = [0.010, 0.030, 0.090];
        for (d, want) in slept.iter().zip(expected) {
            assert!((d.as_secs_f64() - want).abs() < 1e-9, "{:?} != {}", d, want);
        }
    }

    #[test]
    fn test_success_on_kth_attempt_stops_retrying() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1), 2.0).unwrap();
        let calls = Cell::new(0u32);
        let mut sleeps = 0;

        let result = run_with_retry_sleeping(
            &policy,
            flaky,
            |_| sleeps += 1,
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(TestError::Flaky(calls.get()))
                } else {
                    Ok("done")
                }
            },
        );

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 3);
        assert_eq!(sleeps, 2);
    }

    #[test]
    fn test_non_retryable_error_returns_immediately() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1), 2.0).unwrap();
        let calls = Cell::new(0u32);
        let mut sleeps = 0;

        let result: Result<(), TestError> = run_with_retry_sleeping(
            &policy,
            flaky,
            |_| sleeps += 1,
            || {
                calls.set(calls.get() + 1);
                Err(TestError::Fatal)
            },
        );

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.get(), 1);
        assert_eq!(sleeps, 0);
    }

    #[test]
    fn test_single_try_never_sleeps() {
        let policy = RetryPolicy::new(1, Duration::from_millis(1), 2.0).unwrap();
        let mut sleeps = 0;
        let result: Result<(), TestError> =
            run_with_retry_sleeping(&policy, flaky, |_| sleeps += 1, || Err(TestError::Flaky(1)));
        assert_eq!(result, Err(TestError::Flaky(1)));
        assert_eq!(sleeps, 0);
    }

    #[test]
    fn test_real_sleep_path() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1), 1.0).unwrap();
        let calls = Cell::new(0u32);
        let result = run_with_retry(&policy, flaky, || {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(TestError::Flaky(1))
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result, Ok(2));
    }
}
