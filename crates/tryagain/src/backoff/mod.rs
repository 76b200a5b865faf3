//! Backoff strategies.
//!
//! A backoff strategy maps the upcoming attempt number to the time the retry
//! loop sleeps before making that attempt.
//!
//! # Key Types
//!
//! - [`Backoff`] - Core trait, implemented for any `Fn(u32) -> Duration`
//! - [`NoBackoff`] - Always zero, the default
//! - [`ExponentialJitter`] - `2^attempt` seconds with ±33% jitter
//!
//! # Examples
//!
//! ```rust
//! use tryagain::backoff::{Backoff, ExponentialJitter, NoBackoff};
//! use std::time::Duration;
//!
//! assert_eq!(NoBackoff.delay(4), Duration::ZERO);
//!
//! let delay = ExponentialJitter::new().delay(1);
//! assert!(delay >= Duration::from_millis(1334));
//! assert!(delay <= Duration::from_millis(2666));
//!
//! // Closures are strategies too
//! let linear = |attempt: u32| Duration::from_millis(100 * u64::from(attempt));
//! assert_eq!(linear.delay(3), Duration::from_millis(300));
//! ```

mod jitter;
mod strategy;

pub use jitter::{ExponentialJitter, exponential_jitter, jitter, jitter_with};
pub use strategy::{Backoff, NoBackoff, no_backoff};
