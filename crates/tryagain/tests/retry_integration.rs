//! Integration tests for the retry loop with explicit configuration

use rstest::rstest;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tryagain::prelude::*;

/// A simulated dependency that fails a fixed number of times
struct Flaky {
    calls: AtomicU32,
    failures: u32,
}

impl Flaky {
    fn new(failures: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
        }
    }

    fn call(&self) -> Result<&'static str, io::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        } else {
            Ok("payload")
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[rstest]
#[case::first_try(0, 10, Some("payload"), 1)]
#[case::third_try(2, 10, Some("payload"), 3)]
#[case::last_budgeted_try(4, 5, Some("payload"), 5)]
#[case::one_short(5, 5, None, 5)]
#[case::budget_of_three(100, 3, None, 3)]
fn test_flaky_dependency(
    #[case] failures: u32,
    #[case] budget: u32,
    #[case] expected: Option<&str>,
    #[case] expected_calls: u32,
) {
    let flaky = Flaky::new(failures);
    let result = Retry::new(RetryConfig::new(budget))
        .run(|_| flaky.call().map_err(Failure::retry));

    match expected {
        Some(value) => assert_eq!(result.unwrap(), value),
        None => {
            let err = result.unwrap_err();
            assert!(is_budget_exhausted(&err));
            assert_eq!(err.attempts(), Some(budget));
        }
    }
    assert_eq!(flaky.calls(), expected_calls);
}

#[test]
fn test_caller_classifies_errors() {
    let mut kinds = vec![
        io::ErrorKind::TimedOut,
        io::ErrorKind::ConnectionRefused,
        io::ErrorKind::NotFound,
        io::ErrorKind::TimedOut,
    ]
    .into_iter();

    let result: Result<(), _> = Retry::new(RetryConfig::default()).run(|_| {
        let kind = kinds.next().unwrap_or(io::ErrorKind::Other);
        let transient = matches!(
            kind,
            io::ErrorKind::TimedOut | io::ErrorKind::ConnectionRefused
        );
        Err(Failure::new(io::Error::from(kind), transient))
    });

    let err = result.unwrap_err();
    assert!(!err.is_exhausted());
    assert_eq!(err.into_inner().unwrap().kind(), io::ErrorKind::NotFound);
    // The fourth error was never produced
    assert_eq!(kinds.next(), Some(io::ErrorKind::TimedOut));
}

#[test]
fn test_only_last_error_is_kept() {
    let result: Result<(), _> = Retry::new(RetryConfig::new(3)).run(|attempt| {
        if attempt < 3 {
            Err(Failure::retry(format!("attempt {}", attempt)))
        } else {
            Err(Failure::fatal(format!("attempt {}", attempt)))
        }
    });

    assert_eq!(
        result.unwrap_err().into_inner().as_deref(),
        Some("attempt 3")
    );
}

#[test]
fn test_error_message_is_not_wrapped() {
    let result: Result<(), RetryError<io::Error>> = Retry::new(RetryConfig::new(1))
        .run(|_| Err(Failure::fatal(io::Error::other("quota exceeded"))));

    assert_eq!(result.unwrap_err().to_string(), "quota exceeded");
}

#[test]
fn test_exhausted_converts_to_boxed_error() {
    fn load() -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        let value = Retry::new(RetryConfig::new(2))
            .run(|_| Err::<u32, _>(Failure::retry(io::Error::other("down"))))?;
        Ok(value)
    }

    let err = load().unwrap_err();
    assert!(tryagain::is_budget_exhausted_dyn::<io::Error>(err.as_ref()));
    assert_eq!(err.to_string(), "exceeded retry limit after 2 attempts");
}

#[test]
fn test_seeded_backoff_is_shared_across_threads() {
    let backoff = Arc::new(ExponentialJitter::seeded(11));

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let backoff = Arc::clone(&backoff);
            scope.spawn(move || {
                let delay = backoff.delay(1);
                assert!((1334..=2666).contains(&delay.as_millis()));
            });
        }
    });
}

#[test]
fn test_custom_capped_strategy() {
    let jitter = ExponentialJitter::new();
    let capped = |attempt: u32| jitter.delay(attempt).min(Duration::from_millis(2));

    let mut calls = 0;
    let result: Result<(), _> = Retry::new(RetryConfig::new(4))
        .with_backoff(capped)
        .run(|_| {
            calls += 1;
            Err(Failure::retry(()))
        });

    assert!(result.unwrap_err().is_exhausted());
    assert_eq!(calls, 4);
}

#[test]
fn test_zero_delay_default() {
    let retry = Retry::new(RetryConfig::new(3));
    assert_eq!(*retry.backoff(), NoBackoff);
}

#[tokio::test(start_paused = true)]
async fn test_async_exponential_jitter_waits() {
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = Arc::clone(&attempts);
    let start = tokio::time::Instant::now();

    let result = Retry::new(RetryConfig::new(4))
        .with_backoff(ExponentialJitter::seeded(3))
        .run_async(move |attempt| {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                if attempt < 4 {
                    Err(Failure::retry(io::Error::other("not ready")))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 4);
    assert_eq!(attempts.load(Ordering::SeqCst), 4);

    // Pauses before attempts 2, 3 and 4: at least 2/3 of (4s + 8s + 16s)
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(2667 + 5334 + 10667),
        "elapsed {:?}",
        elapsed
    );
    assert!(
        elapsed <= Duration::from_millis(5333 + 10666 + 21333 + 10),
        "elapsed {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_async_exhausted_does_not_sleep_after_last_attempt() {
    let start = tokio::time::Instant::now();

    let result: Result<(), _> = Retry::new(RetryConfig::new(2))
        .with_backoff(|_: u32| Duration::from_secs(60))
        .run_async(|_| async { Err(Failure::retry("down")) })
        .await;

    assert!(result.unwrap_err().is_exhausted());
    // One pause between attempt 1 and 2, none after attempt 2
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(60));
    assert!(elapsed < Duration::from_secs(61));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_loops_run_concurrently() {
    let fast = Retry::new(RetryConfig::new(3)).with_backoff(|_: u32| Duration::from_millis(5));
    let slow = Retry::new(RetryConfig::new(2)).with_backoff(|_: u32| Duration::from_millis(5));

    let (a, b) = tokio::join!(
        fast.run_async(|attempt| async move {
            if attempt < 3 {
                Err(Failure::retry("a"))
            } else {
                Ok(attempt)
            }
        }),
        slow.run_async(|_| async { Err::<u32, _>(Failure::retry("b")) }),
    );

    assert_eq!(a.unwrap(), 3);
    assert!(b.unwrap_err().is_exhausted());
}
