//! Browser capability interface.
//!
//! Page objects only talk to the browser through [`BrowserDriver`], so the
//! same workflow runs against real Chromium (`ChromiumDriver`, feature
//! `browser`) or the scripted fake site (`MockDriver`).
//!
//! # Handles and epochs
//!
//! Every navigation starts a new document epoch. Handles remember the epoch
//! they were created in and drivers refuse handles from an earlier epoch with
//! [`ShopperError::StaleElement`], so a product card read before a reload can
//! never be clicked after it.

use crate::locator::Selector;
use crate::result::{ShopperError, ShopperResult};
use crate::wait::{Deadline, LoadState, WaitOptions, DEFAULT_POLL_INTERVAL_MS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Milliseconds in `duration`, saturating
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Reference to one element, valid for the document epoch it was created in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier
    pub id: u64,
    /// Document epoch the handle belongs to
    pub epoch: u64,
    /// Human-readable description (selector path) for logs and errors
    pub description: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: u64, epoch: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            epoch,
            description: description.into(),
        }
    }

    /// Error for using this handle after its document went away
    #[must_use]
    pub const fn stale(&self) -> ShopperError {
        ShopperError::StaleElement {
            id: self.id,
            epoch: self.epoch,
        }
    }
}

/// Abstract driver trait for browser automation
///
/// All calls on one driver are sequential; a driver is one browser tab.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to URL (starts a new epoch)
    async fn navigate(&mut self, url: &str) -> ShopperResult<()>;

    /// First element matching `selector`
    async fn locate(&mut self, selector: &Selector) -> ShopperResult<ElementHandle>;

    /// All elements matching `selector`, in document order
    async fn locate_all(&mut self, selector: &Selector) -> ShopperResult<Vec<ElementHandle>>;

    /// First descendant of `parent` matching `selector`
    async fn locate_within(
        &mut self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ShopperResult<ElementHandle>;

    /// First element matching `inner` inside the iframe matching `frame`
    async fn locate_in_frame(
        &mut self,
        frame: &Selector,
        inner: &Selector,
    ) -> ShopperResult<ElementHandle>;

    /// Number of elements matching `selector`
    async fn count(&mut self, selector: &Selector) -> ShopperResult<usize>;

    /// Whether the element is rendered and visible
    async fn is_visible(&mut self, handle: &ElementHandle) -> ShopperResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&mut self, handle: &ElementHandle) -> ShopperResult<bool>;

    /// Click element
    async fn click(&mut self, handle: &ElementHandle) -> ShopperResult<()>;

    /// Replace the element's value with `text`
    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> ShopperResult<()>;

    /// Text content, trimmed
    async fn text_content(&mut self, handle: &ElementHandle) -> ShopperResult<String>;

    /// Get current URL
    async fn current_url(&mut self) -> ShopperResult<String>;

    /// Document title
    async fn title(&mut self) -> ShopperResult<String>;

    /// Block until the page reaches `state`
    async fn wait_for_load_state(&mut self, state: LoadState, timeout: Duration)
        -> ShopperResult<()>;

    /// Save a PNG screenshot of the page
    async fn screenshot(&mut self, path: &Path) -> ShopperResult<()>;

    /// Save the serialized DOM
    async fn html_dump(&mut self, path: &Path) -> ShopperResult<()>;

    /// Close the browser
    async fn close(&mut self) -> ShopperResult<()>;

    /// Block until the element is visible
    async fn wait_visible(&mut self, handle: &ElementHandle, timeout: Duration) -> ShopperResult<()> {
        let options = WaitOptions::new(duration_ms(timeout), DEFAULT_POLL_INTERVAL_MS);
        let mut deadline = Deadline::start(options, format!("{} to be visible", handle.description));
        while !self.is_visible(handle).await? {
            deadline.tick().await?;
        }
        Ok(())
    }

    /// Block until the element is visible and enabled
    async fn wait_enabled(&mut self, handle: &ElementHandle, timeout: Duration) -> ShopperResult<()> {
        let options = WaitOptions::new(duration_ms(timeout), DEFAULT_POLL_INTERVAL_MS);
        let mut deadline = Deadline::start(options, format!("{} to be enabled", handle.description));
        while !(self.is_visible(handle).await? && self.is_enabled(handle).await?) {
            deadline.tick().await?;
        }
        Ok(())
    }

    /// Block until `selector` matches something, then return the first match
    async fn wait_for_selector(
        &mut self,
        selector: &Selector,
        options: WaitOptions,
    ) -> ShopperResult<ElementHandle> {
        let mut deadline = Deadline::start(options, format!("{selector} to appear"));
        loop {
            match self.locate(selector).await {
                Ok(handle) => return Ok(handle),
                Err(e) if e.is_transient() => deadline.tick().await?,
                Err(e) => return Err(e),
            }
        }
    }
}
