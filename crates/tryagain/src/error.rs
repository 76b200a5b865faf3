//! Error types returned by the retry loop.

use std::error::Error;

/// Why a retry loop stopped without a success.
///
/// Exactly one of two things ends a loop in failure:
///
/// - the operation reported an error and asked not to be retried, in which
///   case that error comes back untouched in [`RetryError::Aborted`];
/// - the operation kept asking for retries until the budget ran out, which
///   yields [`RetryError::Exhausted`].
///
/// Only the most recent error is ever kept. Errors from earlier attempts
/// are dropped, never combined.
///
/// # Examples
///
/// ```rust
/// use tryagain::{Failure, Retry, RetryConfig, RetryError};
///
/// let result: Result<(), RetryError<std::io::Error>> = Retry::new(RetryConfig::new(2))
///     .run(|_| Err(Failure::retry(std::io::Error::other("busy"))));
///
/// match result {
///     Err(RetryError::Exhausted { attempts }) => assert_eq!(attempts, 2),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The operation failed and declined further retries.
    #[error(transparent)]
    Aborted(E),

    /// The retry budget ran out before the operation succeeded.
    #[error("exceeded retry limit after {attempts} attempts")]
    Exhausted {
        /// Number of times the operation was invoked.
        attempts: u32,
    },
}

impl<E> RetryError<E> {
    /// Returns `true` if the loop gave up because the budget ran out.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// The operation's own error, if it ended the loop.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Aborted(err) => Some(err),
            Self::Exhausted { .. } => None,
        }
    }

    /// Borrow the operation's own error, if it ended the loop.
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Aborted(err) => Some(err),
            Self::Exhausted { .. } => None,
        }
    }

    /// Number of invocations, when known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Aborted(_) => None,
            Self::Exhausted { attempts } => Some(*attempts),
        }
    }
}

/// Check whether a loop's error is the exhausted-budget error.
///
/// Classification is by variant, never by message: an operation error whose
/// text reads "exceeded retry limit" is still [`RetryError::Aborted`].
///
/// ```rust
/// use tryagain::{is_budget_exhausted, RetryError};
///
/// let exhausted: RetryError<std::io::Error> = RetryError::Exhausted { attempts: 10 };
/// assert!(is_budget_exhausted(&exhausted));
///
/// let aborted = RetryError::Aborted(std::io::Error::other("exceeded retry limit"));
/// assert!(!is_budget_exhausted(&aborted));
///
/// // A success is never exhausted
/// let ok: Result<(), RetryError<std::io::Error>> = Ok(());
/// assert!(!ok.as_ref().is_err_and(is_budget_exhausted));
/// ```
pub fn is_budget_exhausted<E>(err: &RetryError<E>) -> bool {
    err.is_exhausted()
}

/// Find a [`RetryError`] in a boxed error chain and check whether it is the
/// exhausted variant.
///
/// Useful once the loop's error has been erased into a `Box<dyn Error>`
/// further up the stack.
pub fn is_budget_exhausted_dyn<E>(err: &(dyn Error + 'static)) -> bool
where
    E: Error + 'static,
{
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(retry) = err.downcast_ref::<RetryError<E>>() {
            return retry.is_exhausted();
        }
        current = err.source();
    }
    false
}
