#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry an operation until it succeeds, declines another attempt, or runs
//! out of budget.
//!
//! The operation receives the attempt number (starting at 1) and returns
//! either a value or a [`Failure`] that says whether it is worth retrying.
//! Between attempts the loop sleeps for however long the [`Backoff`]
//! strategy asks.
//!
//! - **Entry points**: [`retry`], [`retry_with_backoff`] and the
//!   configurable [`Retry`] (blocking [`Retry::run`] or async
//!   [`Retry::run_async`])
//! - **Budget**: process-wide via [`set_max_retries`] (default 10), or per
//!   loop via [`RetryConfig`]
//! - **Backoff**: [`NoBackoff`](backoff::NoBackoff) by default,
//!   [`ExponentialJitter`](backoff::ExponentialJitter) built in, any
//!   `Fn(u32) -> Duration` accepted
//! - **Outcome**: `Ok(T)`, the operation's own error in
//!   [`RetryError::Aborted`], or [`RetryError::Exhausted`]
//!
//! # Examples
//!
//! ```rust
//! use tryagain::prelude::*;
//!
//! let config = RetryConfig::builder().max_retries(3).build();
//!
//! let result: Result<(), RetryError<&str>> = Retry::new(config)
//!     .run(|_attempt| Err(Failure::retry("service unavailable")));
//!
//! assert!(is_budget_exhausted(&result.unwrap_err()));
//! ```
//!
//! With jittered exponential backoff:
//!
//! ```rust,no_run
//! use tryagain::prelude::*;
//!
//! let body = retry_with_backoff(
//!     |attempt| {
//!         std::fs::read_to_string("/tmp/ready").map_err(|err| {
//!             // Only missing files are worth waiting for
//!             let transient = err.kind() == std::io::ErrorKind::NotFound;
//!             Failure::new(err, transient && attempt < 5)
//!         })
//!     },
//!     ExponentialJitter::new(),
//! );
//! ```
//!
//! # Features
//!
//! - `tracing`: emit `debug` events for each retryable failure and a `warn`
//!   event when the budget runs out

pub mod backoff;
pub mod config;
pub mod error;
mod retry;

pub use backoff::Backoff;
pub use config::{
    DEFAULT_MAX_RETRIES, RetryConfig, RetryConfigBuilder, max_retries, set_max_retries,
};
pub use error::{RetryError, is_budget_exhausted, is_budget_exhausted_dyn};
pub use retry::{Failure, Retry, retry, retry_with_backoff};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use tryagain::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{Backoff, ExponentialJitter, NoBackoff};
    pub use crate::config::RetryConfig;
    pub use crate::error::{RetryError, is_budget_exhausted};
    pub use crate::retry::{Failure, Retry, retry, retry_with_backoff};
}
