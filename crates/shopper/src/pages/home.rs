use super::{element_wait, verify_navigation, PageKind, PageObject};
use crate::config::{ShopperConfig, Timeouts};
use crate::criteria::ProductCategory;
use crate::driver::BrowserDriver;
use crate::locator::{HomeLocators, Selector};
use crate::result::{ShopperError, ShopperResult};
use crate::text::extract_number;
use std::time::Duration;
use tracing::{debug, info};

const EXPECTED_TITLE: &str = "Current Temperature";

/// Landing page: temperature readout and the two category buttons
#[derive(Debug, Clone)]
pub struct HomePage {
    base_url: String,
    locators: HomeLocators,
    timeouts: Timeouts,
}

impl PageObject for HomePage {
    fn kind(&self) -> PageKind {
        PageKind::Home
    }

    fn url_pattern(&self) -> &str {
        ""
    }
}

impl HomePage {
    /// Home page of the configured site
    #[must_use]
    pub fn new(config: &ShopperConfig) -> Self {
        Self {
            base_url: config.url_for(""),
            locators: HomeLocators::default(),
            timeouts: config.timeouts,
        }
    }

    /// Open the site and wait until the temperature readout is visible
    pub async fn load<D: BrowserDriver + ?Sized>(&self, driver: &mut D) -> ShopperResult<()> {
        let load_error = |message: String| ShopperError::Load {
            url: self.base_url.clone(),
            message,
        };

        driver
            .navigate(&self.base_url)
            .await
            .map_err(|e| load_error(e.to_string()))?;

        let readout = driver
            .wait_for_selector(&self.locators.temperature, element_wait(&self.timeouts))
            .await
            .map_err(|e| load_error(e.to_string()))?;
        driver
            .wait_visible(&readout, Duration::from_millis(self.timeouts.element_ms))
            .await
            .map_err(|e| load_error(e.to_string()))?;

        let title = driver.title().await?;
        if !title.contains(EXPECTED_TITLE) {
            return Err(load_error(format!(
                "title {title:?} does not contain {EXPECTED_TITLE:?}"
            )));
        }
        info!(url = %self.base_url, "home page loaded");
        Ok(())
    }

    /// Current temperature in °C
    pub async fn read_temperature<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> ShopperResult<i32> {
        let readout = driver.locate(&self.locators.temperature).await?;
        let text = driver.text_content(&readout).await?;
        let temperature = extract_number(&text).ok_or_else(|| ShopperError::Extract {
            selector: self.locators.temperature.to_string(),
            text: text.clone(),
        })?;
        debug!(raw = %text, temperature, "temperature read");
        Ok(temperature)
    }

    /// Click the category's buy button and wait for its listing page
    pub async fn go_to_category<D: BrowserDriver + ?Sized>(
        &self,
        driver: &mut D,
        category: ProductCategory,
    ) -> ShopperResult<()> {
        let button = driver.locate(self.buy_button(category)).await?;
        driver.click(&button).await?;
        verify_navigation(
            driver,
            category.url_part(),
            category.heading(),
            self.timeouts.wait(self.timeouts.navigation_ms),
        )
        .await?;
        info!(%category, "on category page");
        Ok(())
    }

    const fn buy_button(&self, category: ProductCategory) -> &Selector {
        match category {
            ProductCategory::Moisturizer => &self.locators.buy_moisturizers,
            ProductCategory::Sunscreen => &self.locators.buy_sunscreens,
        }
    }
}
