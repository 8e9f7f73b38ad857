//! Page objects for the four pages of the site.
//!
//! Page objects are stateless apart from their locators and timeouts: every
//! operation borrows the driver for its duration and re-reads the page, so no
//! element reference outlives the call that produced it (except
//! [`ProductEntry::activation`], which the driver guards by epoch).

mod cart;
mod home;
mod payment;
mod product;

pub use cart::CartPage;
pub use home::HomePage;
pub use payment::PaymentPage;
pub use product::{cheapest_matching, ProductEntry, ProductPage};

use crate::config::{ShopperConfig, Timeouts};
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::{Selector, PAGE_HEADING};
use crate::result::{ShopperError, ShopperResult};
use crate::wait::{Deadline, WaitOptions};
use std::fmt;
use tracing::debug;

/// The pages a run visits, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Temperature readout and category buttons
    Home,
    /// Moisturizer or sunscreen listing
    Product,
    /// Checkout table and pay button
    Cart,
    /// Embedded card form
    Payment,
}

impl PageKind {
    /// All page kinds in visiting order
    pub const ALL: [Self; 4] = [Self::Home, Self::Product, Self::Cart, Self::Payment];

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Product => "product",
            Self::Cart => "cart",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for page objects representing a page of the site
pub trait PageObject {
    /// Which page this is
    fn kind(&self) -> PageKind;

    /// URL fragment that identifies the page ("" for the home page)
    fn url_pattern(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &'static str {
        self.kind().name()
    }
}

/// One page object per [`PageKind`], built once from configuration
#[derive(Debug, Clone)]
pub struct Pages {
    /// Home page
    pub home: HomePage,
    /// Product listing page
    pub product: ProductPage,
    /// Cart page
    pub cart: CartPage,
    /// Payment form
    pub payment: PaymentPage,
}

impl Pages {
    /// Build every page object from `config`
    #[must_use]
    pub fn new(config: &ShopperConfig) -> Self {
        Self {
            home: HomePage::new(config),
            product: ProductPage::new(config),
            cart: CartPage::new(config),
            payment: PaymentPage::new(config),
        }
    }

    /// The page object for `kind`
    #[must_use]
    pub fn get(&self, kind: PageKind) -> &dyn PageObject {
        match kind {
            PageKind::Home => &self.home,
            PageKind::Product => &self.product,
            PageKind::Cart => &self.cart,
            PageKind::Payment => &self.payment,
        }
    }
}

/// Wait until the URL contains `url_part` (case-insensitive) and the page
/// heading contains `heading`.
///
/// Lookup failures while the new document commits are retried until the
/// deadline; the last one ends up in the `Navigation` message.
pub(crate) async fn verify_navigation<D: BrowserDriver + ?Sized>(
    driver: &mut D,
    url_part: &str,
    heading: &str,
    options: WaitOptions,
) -> ShopperResult<()> {
    let heading_selector = Selector::css(PAGE_HEADING);
    let wanted_url = url_part.to_lowercase();
    let mut deadline = Deadline::start(options, format!("{url_part} page"));
    let mut last_error = None;
    loop {
        match heading_on(driver, &wanted_url, &heading_selector).await {
            Ok(Some(text)) if text.contains(heading) => {
                debug!(heading = %text, "navigation verified");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) if e.is_transient() => {
                debug!(error = %e, "page not settled yet");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
        if deadline.tick().await.is_err() {
            let message = match last_error {
                Some(e) => format!("not reached within {}ms (last error: {e})", options.timeout_ms),
                None => format!("not reached within {}ms", options.timeout_ms),
            };
            return Err(ShopperError::Navigation {
                expected: format!("{url_part} ({heading})"),
                actual_url: driver.current_url().await.unwrap_or_default(),
                message,
            });
        }
    }
}

/// Heading text once the URL matches, `None` while it does not
async fn heading_on<D: BrowserDriver + ?Sized>(
    driver: &mut D,
    wanted_url: &str,
    heading_selector: &Selector,
) -> ShopperResult<Option<String>> {
    let url = driver.current_url().await?;
    if !url.to_lowercase().contains(wanted_url) {
        return Ok(None);
    }
    let handle = driver.locate(heading_selector).await?;
    driver.text_content(&handle).await.map(Some)
}

/// Wait for `inner` to appear inside `frame`
pub(crate) async fn wait_in_frame<D: BrowserDriver + ?Sized>(
    driver: &mut D,
    frame: &Selector,
    inner: &Selector,
    options: WaitOptions,
) -> ShopperResult<ElementHandle> {
    let mut deadline = Deadline::start(options, format!("{inner} in {frame}"));
    loop {
        match driver.locate_in_frame(frame, inner).await {
            Ok(handle) => return Ok(handle),
            Err(e) if e.is_transient() => {
                if deadline.expired() {
                    return Err(e);
                }
                deadline.tick().await?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Wait options for element lookups
pub(crate) const fn element_wait(timeouts: &Timeouts) -> WaitOptions {
    timeouts.wait(timeouts.element_ms)
}
