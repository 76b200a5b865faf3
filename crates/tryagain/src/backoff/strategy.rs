//! The backoff trait and the zero-delay strategy.

use std::time::Duration;

/// Computes how long to wait before the next attempt.
///
/// The retry loop calls [`delay`](Backoff::delay) once per retry, after a
/// retryable failure and before the next invocation, passing the number of
/// the attempt about to be made (so the first call receives `2`).
///
/// Implementations should be stateless: calling `delay` twice with the same
/// attempt may only give different answers when the strategy is randomized
/// on purpose, as [`ExponentialJitter`](super::ExponentialJitter) is.
///
/// Any `Fn(u32) -> Duration` is a strategy, so a plain function or closure
/// can be passed wherever a `Backoff` is expected.
///
/// # Examples
///
/// ```rust
/// use tryagain::backoff::Backoff;
/// use std::time::Duration;
///
/// struct Fixed(Duration);
///
/// impl Backoff for Fixed {
///     fn delay(&self, _attempt: u32) -> Duration {
///         self.0
///     }
/// }
///
/// assert_eq!(Fixed(Duration::from_millis(50)).delay(7), Duration::from_millis(50));
/// ```
pub trait Backoff {
    /// Delay before making `attempt` (always `>= 2`).
    fn delay(&self, attempt: u32) -> Duration;
}

impl<F> Backoff for F
where
    F: Fn(u32) -> Duration,
{
    fn delay(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// Retry immediately. Used when the caller expresses no backoff preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoBackoff;

impl Backoff for NoBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// Function form of [`NoBackoff`].
pub fn no_backoff(_attempt: u32) -> Duration {
    Duration::ZERO
}
