//! Bounded waits.
//!
//! Every wait polls a condition at a fixed interval until a deadline; running
//! out of time is an error, never a silent no-op.

use crate::result::{ShopperError, ShopperResult};
use std::time::Duration;
use tokio::time::Instant;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new resource loads)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Page load states (Playwright parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no requests for 500ms)
    NetworkIdle,
}

impl LoadState {
    /// Get the JavaScript event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Wait options with the given timeout and poll interval
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Deadline for one bounded wait.
///
/// ```ignore
/// let mut deadline = Deadline::start(options, "cart counter to increase");
/// while read_counter(driver).await? <= before {
///     deadline.tick().await?;
/// }
/// ```
#[derive(Debug)]
pub struct Deadline {
    options: WaitOptions,
    until: Instant,
    condition: String,
}

impl Deadline {
    /// Start the clock
    #[must_use]
    pub fn start(options: WaitOptions, condition: impl Into<String>) -> Self {
        Self {
            options,
            until: Instant::now() + options.timeout(),
            condition: condition.into(),
        }
    }

    /// Sleep one poll interval, or fail if the deadline has passed
    pub async fn tick(&mut self) -> ShopperResult<()> {
        if self.expired() {
            return Err(self.timeout_error());
        }
        let remaining = self.until.saturating_duration_since(Instant::now());
        tokio::time::sleep(self.options.poll_interval().min(remaining)).await;
        Ok(())
    }

    /// Whether the deadline has passed
    #[must_use]
    pub fn expired(&self) -> bool {
        Instant::now() >= self.until
    }

    /// The error this deadline reports when it expires
    #[must_use]
    pub fn timeout_error(&self) -> ShopperError {
        ShopperError::Timeout {
            ms: self.options.timeout_ms,
            condition: self.condition.clone(),
        }
    }
}
