use super::{wait_in_frame, PageKind, PageObject};
use crate::config::{ShopperConfig, Timeouts};
use crate::driver::BrowserDriver;
use crate::locator::{CartLocators, PaymentLocators};
use crate::reconcile::{reconcile, verify_names, CartItem};
use crate::result::{ShopperError, ShopperResult};
use crate::text::extract_amount;
use std::time::Duration;
use tracing::{debug, info};

/// Checkout page: item table, total and the pay button
#[derive(Debug, Clone)]
pub struct CartPage {
    locators: CartLocators,
    payment: PaymentLocators,
    timeouts: Timeouts,
}

impl PageObject for CartPage {
    fn kind(&self) -> PageKind {
        PageKind::Cart
    }

    fn url_pattern(&self) -> &str {
        "cart"
    }
}

impl CartPage {
    /// Cart page of the configured site
    #[must_use]
    pub fn new(config: &ShopperConfig) -> Self {
        Self {
            locators: CartLocators::default(),
            payment: PaymentLocators::new(&config.site.payment_frame, &config.site.success_text),
            timeouts: config.timeouts,
        }
    }

    /// Rows of the cart table, read now
    pub async fn read_items<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> ShopperResult<Vec<CartItem>> {
        let rows = driver.locate_all(&self.locators.item_row).await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let name_el = driver.locate_within(row, &self.locators.item_name).await?;
            let name = driver.text_content(&name_el).await?;
            let price_el = driver.locate_within(row, &self.locators.item_price).await?;
            let price_text = driver.text_content(&price_el).await?;
            let price = extract_amount(&price_text).ok_or_else(|| ShopperError::Extract {
                selector: self.locators.item_price.to_string(),
                text: price_text.clone(),
            })?;
            items.push(CartItem::new(name, price));
        }
        debug!(count = items.len(), "cart rows read");
        Ok(items)
    }

    /// Every expected name is in the cart; returns the rows read
    pub async fn verify_contains<D, S>(
        &self,
        driver: &mut D,
        expected: &[S],
    ) -> ShopperResult<Vec<CartItem>>
    where
        D: BrowserDriver + ?Sized,
        S: AsRef<str> + Sync,
    {
        let items = self.read_items(driver).await?;
        let names: Vec<String> = items.iter().map(|item| item.name.clone()).collect();
        verify_names(expected, &names)?;
        Ok(items)
    }

    /// The displayed total equals the sum of the rows; returns it
    pub async fn verify_total<D: BrowserDriver + ?Sized>(&self, driver: &mut D) -> ShopperResult<u32> {
        let items = self.read_items(driver).await?;
        let total_el = driver.locate(&self.locators.total).await?;
        let total_text = driver.text_content(&total_el).await?;
        let displayed = extract_amount(&total_text).ok_or_else(|| ShopperError::Extract {
            selector: self.locators.total.to_string(),
            text: total_text.clone(),
        })?;
        let total = reconcile(&items, displayed)?;
        info!(total, items = items.len(), "cart total reconciled");
        Ok(total)
    }

    /// Click pay and wait for the payment form to show its email field
    pub async fn proceed_to_payment<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> ShopperResult<()> {
        if let Err(e) = self.open_payment_form(driver).await {
            return Err(ShopperError::Navigation {
                expected: "payment form".to_string(),
                actual_url: driver.current_url().await.unwrap_or_default(),
                message: e.to_string(),
            });
        }
        info!("payment form open");
        Ok(())
    }

    async fn open_payment_form<D: BrowserDriver + ?Sized>(&self, driver: &mut D) -> ShopperResult<()> {
        let button = driver.locate(&self.locators.pay_button).await?;
        driver
            .wait_enabled(&button, Duration::from_millis(self.timeouts.element_ms))
            .await?;
        driver.click(&button).await?;

        let frame_wait = self.timeouts.wait(self.timeouts.frame_ms);
        let email = wait_in_frame(driver, &self.payment.frame, &self.payment.email, frame_wait).await?;
        driver.wait_visible(&email, frame_wait.timeout()).await
    }
}
