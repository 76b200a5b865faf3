//! The retry loop.

use crate::backoff::{Backoff, NoBackoff};
use crate::config::{Budget, RetryConfig};
use crate::error::RetryError;
use std::future::Future;
use std::time::Duration;

/// Added to every pause so a zero delay is never scheduled.
const SLEEP_EPSILON: Duration = Duration::from_micros(1);

/// A failed attempt, as reported by the operation.
///
/// Carries the error together with the operation's verdict on whether the
/// loop should try again.
///
/// # Examples
///
/// ```rust
/// use tryagain::Failure;
///
/// let transient = Failure::retry("connection reset");
/// assert!(transient.is_retryable());
///
/// let permanent = Failure::fatal("permission denied");
/// assert!(!permanent.is_retryable());
/// assert_eq!(permanent.into_error(), "permission denied");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<E> {
    error: E,
    retry: bool,
}

impl<E> Failure<E> {
    /// A failure with an explicit retry verdict.
    pub fn new(error: E, retry: bool) -> Self {
        Self { error, retry }
    }

    /// A failure worth another attempt.
    pub fn retry(error: E) -> Self {
        Self::new(error, true)
    }

    /// A failure that ends the loop immediately.
    pub fn fatal(error: E) -> Self {
        Self::new(error, false)
    }

    /// Whether the operation asked to be retried.
    pub fn is_retryable(&self) -> bool {
        self.retry
    }

    /// The underlying error.
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Consume the failure, returning the underlying error.
    pub fn into_error(self) -> E {
        self.error
    }
}

/// A configured retry loop.
///
/// Invokes an operation with the attempt number (starting at 1) until it
/// succeeds, fails with a [`Failure::fatal`], or would need more attempts
/// than the budget allows. Between attempts it sleeps for whatever the
/// backoff strategy returns for the upcoming attempt.
///
/// # Examples
///
/// ```rust
/// use tryagain::{Failure, Retry, RetryConfig};
/// use std::time::Duration;
///
/// let retry = Retry::new(RetryConfig::new(5))
///     .with_backoff(|_attempt: u32| Duration::from_millis(1));
///
/// let value = retry.run(|attempt| {
///     if attempt < 3 {
///         Err(Failure::retry(format!("attempt {} failed", attempt)))
///     } else {
///         Ok(attempt * 10)
///     }
/// });
///
/// assert_eq!(value.unwrap(), 30);
/// ```
#[derive(Debug, Clone)]
pub struct Retry<B = NoBackoff> {
    budget: Budget,
    backoff: B,
}

impl Retry<NoBackoff> {
    /// A loop with its own budget and no delay between attempts.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            budget: config.into(),
            backoff: NoBackoff,
        }
    }

    /// A loop that follows the process-wide budget and has no delay.
    ///
    /// The budget is re-read at every check, so
    /// [`set_max_retries`](crate::set_max_retries) affects loops in flight.
    pub fn global() -> Self {
        Self {
            budget: Budget::Global,
            backoff: NoBackoff,
        }
    }
}

impl<B: Backoff> Retry<B> {
    /// Replace the backoff strategy.
    pub fn with_backoff<S: Backoff>(self, backoff: S) -> Retry<S> {
        Retry {
            budget: self.budget,
            backoff,
        }
    }

    /// The backoff strategy in use.
    pub fn backoff(&self) -> &B {
        &self.backoff
    }

    /// The budget that would apply to a check made now.
    pub fn max_retries(&self) -> u32 {
        self.budget.limit()
    }

    /// Run `operation` to completion, blocking the calling thread during
    /// pauses.
    ///
    /// # Returns
    /// - `Ok(T)`: the first successful result
    /// - `Err(RetryError::Aborted(e))`: the operation failed and declined a retry
    /// - `Err(RetryError::Exhausted { .. })`: the budget ran out
    pub fn run<T, E, F>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Result<T, Failure<E>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    let pause = self.after_failure(failure, attempt)?;
                    std::thread::sleep(pause);
                    attempt += 1;
                }
            }
        }
    }

    /// Like [`run`](Self::run), for operations that return a future.
    ///
    /// Pauses use `tokio::time::sleep`, so the loop yields to the runtime
    /// instead of blocking a worker thread. A pause always sits strictly
    /// between a retryable failure and the next invocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tryagain::{Failure, Retry, RetryConfig};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let result = Retry::new(RetryConfig::new(3))
    ///     .run_async(|attempt| async move {
    ///         if attempt == 1 {
    ///             Err(Failure::retry("warming up"))
    ///         } else {
    ///             Ok("ready")
    ///         }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(result.unwrap(), "ready");
    /// # }
    /// ```
    pub async fn run_async<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, Failure<E>>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    let pause = self.after_failure(failure, attempt)?;
                    tokio::time::sleep(pause).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Decide what follows a failed `attempt`: either the terminal error, or
    /// how long to pause before `attempt + 1`.
    fn after_failure<E>(
        &self,
        failure: Failure<E>,
        attempt: u32,
    ) -> Result<Duration, RetryError<E>> {
        if !failure.retry {
            return Err(RetryError::Aborted(failure.error));
        }

        let next = match attempt.checked_add(1) {
            Some(next) if next <= self.budget.limit() => next,
            _ => {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempts = attempt, "retry budget exhausted");
                return Err(RetryError::Exhausted { attempts: attempt });
            }
        };

        let delay = self.backoff.delay(next);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            next_attempt = next,
            delay_ms = whole_millis(delay),
            "retryable failure, backing off"
        );

        Ok(delay.saturating_add(SLEEP_EPSILON))
    }
}

/// Milliseconds in `delay`, saturating at `u64::MAX`.
#[cfg(any(test, feature = "tracing"))]
fn whole_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Retry `operation` under the process-wide budget, with no delay between
/// attempts.
///
/// # Examples
///
/// ```rust
/// use tryagain::{retry, Failure};
///
/// let mut calls = 0;
/// let result = retry(|_attempt| {
///     calls += 1;
///     if calls < 3 {
///         Err(Failure::retry("not yet"))
///     } else {
///         Ok(())
///     }
/// });
///
/// assert!(result.is_ok());
/// assert_eq!(calls, 3);
/// ```
pub fn retry<T, E, F>(operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Result<T, Failure<E>>,
{
    Retry::global().run(operation)
}

/// Retry `operation` under the process-wide budget, pausing according to
/// `backoff`.
///
/// ```rust,no_run
/// use tryagain::{retry_with_backoff, Failure};
/// use tryagain::backoff::exponential_jitter;
///
/// let result = retry_with_backoff(
///     |_attempt| std::fs::read_to_string("/var/run/app.pid").map_err(Failure::retry),
///     exponential_jitter,
/// );
/// ```
pub fn retry_with_backoff<T, E, F, B>(operation: F, backoff: B) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Result<T, Failure<E>>,
    B: Backoff,
{
    Retry::global().with_backoff(backoff).run(operation)
}
