use super::{element_wait, wait_in_frame, PageKind, PageObject};
use crate::config::{PaymentDetails, ShopperConfig, Timeouts};
use crate::driver::BrowserDriver;
use crate::locator::{PaymentLocators, Selector};
use crate::result::{ShopperError, ShopperResult};
use crate::wait::{Deadline, LoadState};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Embedded card form and the confirmation page it leads to
#[derive(Debug, Clone)]
pub struct PaymentPage {
    locators: PaymentLocators,
    timeouts: Timeouts,
}

impl PageObject for PaymentPage {
    fn kind(&self) -> PageKind {
        PageKind::Payment
    }

    fn url_pattern(&self) -> &str {
        "confirmation"
    }
}

impl PaymentPage {
    /// Payment form of the configured site
    #[must_use]
    pub fn new(config: &ShopperConfig) -> Self {
        Self {
            locators: PaymentLocators::new(&config.site.payment_frame, &config.site.success_text),
            timeouts: config.timeouts,
        }
    }

    /// Fill the card form and submit it.
    ///
    /// Email, card number, expiry and CVC are required. The ZIP field only
    /// appears for some cards; when it is absent the form is submitted
    /// without it.
    pub async fn fill_and_submit<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        details: &PaymentDetails,
    ) -> ShopperResult<()> {
        let expiry = details.expiry();
        let required: [(&str, &Selector, &str); 4] = [
            ("email", &self.locators.email, details.email.as_str()),
            ("card_number", &self.locators.card_number, details.card_number.as_str()),
            ("expiry", &self.locators.expiry, expiry.as_str()),
            ("cvc", &self.locators.cvc, details.cvc.as_str()),
        ];
        for (field, selector, value) in required {
            self.fill_field(driver, selector, value, self.timeouts.element_ms)
                .await
                .map_err(|e| ShopperError::form(field, e.to_string()))?;
            debug!(field, "payment field filled");
        }

        if let Some(zip) = &details.zip {
            match self
                .fill_field(driver, &self.locators.zip, zip, self.timeouts.optional_field_ms)
                .await
            {
                Ok(()) => debug!(field = "zip", "payment field filled"),
                Err(e) if e.is_not_found() || matches!(e, ShopperError::Timeout { .. }) => {
                    warn!(error = %e, "zip field not shown, continuing without it");
                }
                Err(e) => return Err(ShopperError::form("zip", e.to_string())),
            }
        }

        self.submit(driver).await
    }

    async fn fill_field<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        selector: &Selector,
        value: &str,
        timeout_ms: u64,
    ) -> ShopperResult<()> {
        let options = self.timeouts.wait(timeout_ms);
        let handle = wait_in_frame(driver, &self.locators.frame, selector, options).await?;
        driver.wait_visible(&handle, options.timeout()).await?;
        driver.fill(&handle, value).await
    }

    async fn submit<D: BrowserDriver + ?Sized>(&self, driver: &mut D) -> ShopperResult<()> {
        let before = driver.current_url().await?;
        let button = wait_in_frame(
            driver,
            &self.locators.frame,
            &self.locators.submit,
            element_wait(&self.timeouts),
        )
        .await
        .map_err(|e| ShopperError::form("submit", e.to_string()))?;
        driver
            .click(&button)
            .await
            .map_err(|e| ShopperError::form("submit", e.to_string()))?;

        let mut deadline = Deadline::start(
            self.timeouts.wait(self.timeouts.navigation_ms),
            "URL to change after submit",
        );
        loop {
            let url = driver.current_url().await?;
            if url != before {
                info!(url = %url, "payment submitted");
                break;
            }
            if deadline.tick().await.is_err() {
                return Err(ShopperError::form(
                    "submit",
                    format!("page stayed on {before} after submitting"),
                ));
            }
        }

        if let Err(e) = driver
            .wait_for_load_state(
                LoadState::NetworkIdle,
                Duration::from_millis(self.timeouts.network_idle_ms),
            )
            .await
        {
            warn!(error = %e, "confirmation page did not settle");
        }
        Ok(())
    }

    /// The confirmation page is showing the success banner
    pub async fn verify_success<D: BrowserDriver + ?Sized>(&self, driver: &mut D) -> ShopperResult<()> {
        let url = driver.current_url().await?;
        if !url.to_lowercase().contains(self.url_pattern()) {
            return Err(ShopperError::PaymentNotConfirmed {
                url,
                message: format!("URL does not contain {:?}", self.url_pattern()),
            });
        }

        let banner = driver
            .wait_for_selector(&self.locators.success_banner, element_wait(&self.timeouts))
            .await;
        let visible = match banner {
            Ok(handle) => {
                driver
                    .wait_visible(&handle, Duration::from_millis(self.timeouts.element_ms))
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = visible {
            return Err(ShopperError::PaymentNotConfirmed {
                url,
                message: format!("{} not shown: {e}", self.locators.success_banner),
            });
        }
        info!(url = %url, "payment confirmed");
        Ok(())
    }
}
