use super::{element_wait, verify_navigation, PageKind, PageObject};
use crate::config::{ShopperConfig, Timeouts};
use crate::driver::{BrowserDriver, ElementHandle};
use crate::locator::ProductLocators;
use crate::result::{ShopperError, ShopperResult};
use crate::text::{extract_amount, normalize_product_name};
use crate::wait::{Deadline, LoadState};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A product card as listed right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEntry {
    /// Displayed name
    pub name: String,
    /// Displayed price
    pub price: u32,
    /// The card's add button
    pub activation: ElementHandle,
}

/// Cheapest entry whose name contains `needle` (case-insensitive, hyphens
/// and spaces equivalent). The first listed entry wins a price tie.
pub fn cheapest_matching<'a>(
    entries: &'a [ProductEntry],
    needle: &str,
) -> ShopperResult<&'a ProductEntry> {
    let needle_norm = normalize_product_name(needle);
    entries
        .iter()
        .filter(|entry| normalize_product_name(&entry.name).contains(&needle_norm))
        .min_by_key(|entry| entry.price)
        .ok_or_else(|| ShopperError::NotFound {
            criterion: needle.to_string(),
        })
}

/// Moisturizer or sunscreen listing
#[derive(Debug, Clone)]
pub struct ProductPage {
    locators: ProductLocators,
    timeouts: Timeouts,
}

impl PageObject for ProductPage {
    fn kind(&self) -> PageKind {
        PageKind::Product
    }

    /// Category dependent; checked against the category on arrival
    fn url_pattern(&self) -> &str {
        ""
    }
}

impl ProductPage {
    /// Listing page of the configured site
    #[must_use]
    pub fn new(config: &ShopperConfig) -> Self {
        Self {
            locators: ProductLocators::default(),
            timeouts: config.timeouts,
        }
    }

    /// Every complete product card currently displayed. A listing that shows
    /// no cards within the element timeout is empty, not an error.
    pub async fn list_products<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> ShopperResult<Vec<ProductEntry>> {
        match driver
            .wait_for_selector(&self.locators.product_card, element_wait(&self.timeouts))
            .await
        {
            Ok(_) => {}
            Err(ShopperError::Timeout { .. }) => {
                info!("no product cards listed");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }
        if let Err(e) = driver
            .wait_for_load_state(
                LoadState::NetworkIdle,
                Duration::from_millis(self.timeouts.network_idle_ms),
            )
            .await
        {
            debug!(error = %e, "listing did not settle, reading cards anyway");
        }

        let cards = driver.locate_all(&self.locators.product_card).await?;
        let mut entries = Vec::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            match self.read_card(driver, card).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) if e.is_not_found() => {
                    warn!(index, error = %e, "skipping incomplete product card");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(count = entries.len(), "products listed");
        Ok(entries)
    }

    async fn read_card<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        card: &ElementHandle,
    ) -> ShopperResult<Option<ProductEntry>> {
        let name_el = driver.locate_within(card, &self.locators.name).await?;
        let name = driver.text_content(&name_el).await?;
        let price_el = driver.locate_within(card, &self.locators.price).await?;
        let price_text = driver.text_content(&price_el).await?;
        let activation = driver.locate_within(card, &self.locators.add_button).await?;

        let Some(price) = extract_amount(&price_text) else {
            warn!(name = %name, price = %price_text, "skipping product card without a price");
            return Ok(None);
        };
        if name.trim().is_empty() {
            warn!(price, "skipping product card without a name");
            return Ok(None);
        }
        Ok(Some(ProductEntry {
            name,
            price,
            activation,
        }))
    }

    /// Cheapest listed product whose name contains `needle`
    pub async fn cheapest<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        needle: &str,
    ) -> ShopperResult<ProductEntry> {
        let entries = self.list_products(driver).await?;
        let entry = cheapest_matching(&entries, needle)?;
        info!(needle, name = %entry.name, price = entry.price, "cheapest product chosen");
        Ok(entry.clone())
    }

    /// Number of items the cart button reports ("Empty" counts as 0)
    pub async fn cart_count<D: BrowserDriver + ?Sized>(&self, driver: &mut D) -> ShopperResult<u32> {
        let button = driver.locate(&self.locators.cart_button).await?;
        let text = driver.text_content(&button).await?;
        Ok(extract_amount(&text).unwrap_or(0))
    }

    /// Activate the product and wait until the cart counter goes up.
    ///
    /// Returns the new counter value.
    pub async fn add_to_cart<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        entry: &ProductEntry,
    ) -> ShopperResult<u32> {
        let before = self.cart_count(driver).await?;
        driver.click(&entry.activation).await?;

        let mut deadline = Deadline::start(
            self.timeouts.wait(self.timeouts.cart_update_ms),
            format!("cart counter above {before}"),
        );
        loop {
            let after = self.cart_count(driver).await?;
            if after > before {
                info!(name = %entry.name, count = after, "added to cart");
                return Ok(after);
            }
            if deadline.tick().await.is_err() {
                return Err(ShopperError::AddFailed {
                    product: entry.name.clone(),
                    before,
                    after,
                });
            }
        }
    }

    /// Open the cart and wait for the checkout page
    pub async fn go_to_cart<D: BrowserDriver + ?Sized>(&self, driver: &mut D) -> ShopperResult<()> {
        let button = driver.locate(&self.locators.cart_button).await?;
        driver.click(&button).await?;
        verify_navigation(
            driver,
            "cart",
            "Checkout",
            self.timeouts.wait(self.timeouts.navigation_ms),
        )
        .await
    }
}
