//! Weather Shopper: page-object workflow for the Weather Shopper demo store.
//!
//! A run reads the current temperature, picks moisturizers or sunscreens,
//! adds the cheapest two matching products, reconciles the cart total and
//! pays with a test card, checking every step on the way.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ Workflow     │──►│ Page objects │──►│ BrowserDriver  │
//! │ (5 stages,   │   │ home/product │   │ ChromiumDriver │
//! │ SessionState)│   │ cart/payment │   │ MockDriver     │
//! └──────────────┘   └──────────────┘   └────────────────┘
//!        │                  │
//!        ▼                  ▼
//!   criteria, reconcile (pure)   locator, wait, text
//! ```
//!
//! # Example
//!
//! ```no_run
//! use weather_shopper::prelude::*;
//!
//! # async fn demo() -> ShopperResult<()> {
//! let config = ShopperConfig::load(None)?;
//! let mut driver = MockDriver::new(MockSite::new());
//! let outcome = Workflow::new(&mut driver, &config).run().await;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc)]
mod artifacts;
mod config;
pub mod criteria;
#[allow(clippy::missing_errors_doc)]
mod driver;
mod locator;
#[allow(clippy::missing_errors_doc)]
pub mod mock;
#[allow(clippy::missing_errors_doc)]
pub mod pages;
pub mod reconcile;
mod report;
mod result;
pub mod runner;
mod state;
pub mod text;
pub mod wait;
#[allow(clippy::missing_errors_doc)]
pub mod workflow;

/// Real browser control over CDP
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod chromium;

pub use artifacts::{ArtifactCapture, Artifacts};
pub use config::{
    BrowserSettings, PaymentDetails, ShopperConfig, SiteConfig, Timeouts, DEFAULT_BASE_URL,
    DEFAULT_PAYMENT_FRAME, DEFAULT_SUCCESS_TEXT,
};
pub use criteria::{select_category, ProductCategory};
pub use driver::{duration_ms, BrowserDriver, ElementHandle};
pub use locator::{
    CartLocators, HomeLocators, PaymentLocators, ProductLocators, Selector, PAGE_HEADING,
};
pub use reconcile::{reconcile, verify_names, CartItem};
pub use report::{FailureReport, Outcome, RunReport};
pub use result::{ShopperError, ShopperResult};
pub use state::{SessionSnapshot, SessionState, WriteOnce};
pub use workflow::{RunOutcome, Stage, Workflow, WorkflowState};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::mock::{MockDriver, MockProduct, MockSite};
    pub use super::pages::{PageKind, PageObject, Pages, ProductEntry};
    pub use super::runner::{run_many, run_once};
    pub use super::wait::{LoadState, WaitOptions};
    pub use super::*;

    #[cfg(feature = "browser")]
    pub use super::chromium::ChromiumDriver;
}
