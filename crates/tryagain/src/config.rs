//! Retry budget configuration.
//!
//! The budget caps how many times an operation is invoked. It can come from
//! two places:
//!
//! - the process-wide value behind [`max_retries`] / [`set_max_retries`],
//!   used by [`retry`](crate::retry()) and [`retry_with_backoff`](crate::retry_with_backoff);
//! - an explicit [`RetryConfig`] handed to [`Retry::new`](crate::Retry::new),
//!   which is unaffected by the process-wide value.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Budget used when nothing else is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

static MAX_RETRIES: AtomicU32 = AtomicU32::new(DEFAULT_MAX_RETRIES);

/// Current process-wide retry budget.
pub fn max_retries() -> u32 {
    MAX_RETRIES.load(Ordering::Relaxed)
}

/// Change the process-wide retry budget.
///
/// Loops already in flight pick up the new value at their next budget check.
/// No ordering with other memory operations is implied: the last write wins.
pub fn set_max_retries(max_retries: u32) {
    MAX_RETRIES.store(max_retries, Ordering::Relaxed);
}

/// Explicit retry configuration for a single [`Retry`](crate::Retry).
///
/// # Examples
///
/// ```rust
/// use tryagain::RetryConfig;
///
/// let config = RetryConfig::builder().max_retries(3).build();
/// assert_eq!(config.max_retries(), 3);
///
/// assert_eq!(RetryConfig::default().max_retries(), 10);
/// ```
///
/// The config deserializes from callers' own settings files, with missing
/// fields falling back to their defaults:
///
/// ```rust
/// use tryagain::RetryConfig;
///
/// let config: RetryConfig = serde_json::from_str(r#"{"max_retries": 5}"#).unwrap();
/// assert_eq!(config.max_retries(), 5);
///
/// let config: RetryConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config, RetryConfig::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    max_retries: u32,
}

impl RetryConfig {
    /// Config with the given budget.
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Create a new builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Snapshot of the process-wide budget.
    ///
    /// Later calls to [`set_max_retries`] do not affect the returned value.
    pub fn global() -> Self {
        Self::new(max_retries())
    }

    /// Maximum number of invocations.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

/// Builder for [`RetryConfig`].
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    max_retries: Option<u32>,
}

impl RetryConfigBuilder {
    /// Set the maximum number of invocations.
    ///
    /// Default: 10
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Build the config, using defaults for unset values.
    pub fn build(self) -> RetryConfig {
        RetryConfig::new(self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES))
    }
}

/// Where a loop reads its budget from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Budget {
    /// Re-read the process-wide value at every check.
    Global,
    /// Fixed for the lifetime of the loop.
    Fixed(u32),
}

impl Budget {
    pub(crate) fn limit(self) -> u32 {
        match self {
            Self::Global => max_retries(),
            Self::Fixed(limit) => limit,
        }
    }
}

impl From<RetryConfig> for Budget {
    fn from(config: RetryConfig) -> Self {
        Self::Fixed(config.max_retries)
    }
}
