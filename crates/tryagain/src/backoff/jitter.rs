//! Exponential backoff with jitter.

use super::strategy::Backoff;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Exponential backoff with ±0-33% jitter.
///
/// The delay before attempt `n` is `2^n` seconds, moved up or down by a
/// random amount of at most a third, so independent callers do not retry in
/// lockstep.
///
/// # Mathematical Formula
///
/// ```text
/// base_ms    = 2^n * 1000
/// max_jitter = base_ms / 3                 (integer division)
/// amount     = uniform(0..=max_jitter)
/// delay_ms   = base_ms ± amount            (fair coin)
/// delay_ms   = max(delay_ms, 1)
/// ```
///
/// Growth is not capped: attempt 10 waits roughly `1024s ± 341s`. Wrap the
/// strategy in a closure to impose a ceiling.
///
/// # Randomness
///
/// [`ExponentialJitter::new`] draws from the thread-local generator, which
/// is seeded once per thread from OS entropy. [`ExponentialJitter::seeded`]
/// owns a generator with a fixed seed, for reproducible delay sequences.
///
/// # Examples
///
/// ```rust
/// use tryagain::backoff::{Backoff, ExponentialJitter};
/// use std::time::Duration;
///
/// let backoff = ExponentialJitter::new();
/// let delay = backoff.delay(2);
/// assert!(delay >= Duration::from_millis(2667));
/// assert!(delay <= Duration::from_millis(5333));
///
/// // Capped at one minute
/// let capped = |attempt: u32| backoff.delay(attempt).min(Duration::from_secs(60));
/// assert!(capped.delay(20) <= Duration::from_secs(60));
/// ```
#[derive(Debug, Default)]
pub struct ExponentialJitter {
    rng: Option<Mutex<StdRng>>,
}

impl ExponentialJitter {
    /// Jitter drawn from the thread-local generator.
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Jitter drawn from a generator seeded with `seed`.
    ///
    /// Two instances with the same seed produce the same delay sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl Backoff for ExponentialJitter {
    fn delay(&self, attempt: u32) -> Duration {
        let seconds = base_seconds(attempt);
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                jitter_with(seconds, &mut *rng)
            }
            None => jitter(seconds),
        }
    }
}

/// Function form of [`ExponentialJitter::new`].
pub fn exponential_jitter(attempt: u32) -> Duration {
    jitter(base_seconds(attempt))
}

/// Apply ±0-33% jitter to `seconds`, using the thread-local generator.
///
/// The result is in milliseconds and never zero.
pub fn jitter(seconds: u64) -> Duration {
    jitter_with(seconds, &mut rand::thread_rng())
}

/// Apply ±0-33% jitter to `seconds`, drawing from `rng`.
///
/// # Examples
///
/// ```rust
/// use tryagain::backoff::jitter_with;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use std::time::Duration;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let delay = jitter_with(1, &mut rng);
/// assert!((667..=1333).contains(&delay.as_millis()));
///
/// // Never zero, even without a base
/// assert_eq!(jitter_with(0, &mut rng), Duration::from_millis(1));
/// ```
pub fn jitter_with<R: Rng + ?Sized>(seconds: u64, rng: &mut R) -> Duration {
    let ms = seconds.saturating_mul(1000);
    let max_jitter = ms / 3;
    let amount = rng.gen_range(0..=max_jitter);

    let ms = if rng.gen_bool(0.5) {
        ms.saturating_add(amount)
    } else {
        ms.saturating_sub(amount)
    };

    // A zero delay must never be scheduled
    Duration::from_millis(ms.max(1))
}

/// `2^attempt`, saturating at `u64::MAX` once the shift leaves the type.
fn base_seconds(attempt: u32) -> u64 {
    1u64.checked_shl(attempt).unwrap_or(u64::MAX)
}
