//! Selectors and the site's locator tables.
//!
//! The site markup is addressed through plain CSS plus an optional text
//! filter (the `:has-text()` idea without depending on a Playwright-only
//! pseudo-class), so any driver that can run `querySelectorAll` can resolve
//! them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Combined selector with text filter
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Filter by text content
    ///
    /// `Selector::css("button").with_text("Buy sunscreens")`
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let css = match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        };
        Self::CssWithText {
            css,
            text: text.into(),
        }
    }

    /// The CSS part of the selector
    #[must_use]
    pub fn css_part(&self) -> &str {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css,
        }
    }

    /// The text filter, if any
    #[must_use]
    pub fn text_filter(&self) -> Option<&str> {
        match self {
            Self::Css(_) => None,
            Self::CssWithText { text, .. } => Some(text),
        }
    }

    /// JavaScript expression evaluating to the array of matches under `root`
    #[must_use]
    pub fn to_query_all(&self, root: &str) -> String {
        match self {
            Self::Css(css) => format!("Array.from({root}.querySelectorAll({css:?}))"),
            Self::CssWithText { css, text } => format!(
                "Array.from({root}.querySelectorAll({css:?})).filter(el => (el.textContent || '').includes({text:?}))"
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}

/// Heading element checked after every navigation
pub const PAGE_HEADING: &str = "h2";

/// Home page locators
#[derive(Debug, Clone)]
pub struct HomeLocators {
    /// Current temperature readout
    pub temperature: Selector,
    /// "Buy moisturizers" button
    pub buy_moisturizers: Selector,
    /// "Buy sunscreens" button
    pub buy_sunscreens: Selector,
}

impl Default for HomeLocators {
    fn default() -> Self {
        Self {
            temperature: Selector::css("#temperature"),
            buy_moisturizers: Selector::css("button").with_text("Buy moisturizers"),
            buy_sunscreens: Selector::css("button").with_text("Buy sunscreens"),
        }
    }
}

/// Product listing locators
#[derive(Debug, Clone)]
pub struct ProductLocators {
    /// Cart counter / cart link in the navbar
    pub cart_button: Selector,
    /// One product card
    pub product_card: Selector,
    /// Product name inside a card
    pub name: Selector,
    /// Price line inside a card
    pub price: Selector,
    /// Add button inside a card
    pub add_button: Selector,
}

impl Default for ProductLocators {
    fn default() -> Self {
        Self {
            cart_button: Selector::css("button.thin-text.nav-link"),
            product_card: Selector::css(".container .row .text-center.col-4"),
            name: Selector::css("p.font-weight-bold"),
            price: Selector::css("p").with_text("Price:"),
            add_button: Selector::css("button.btn.btn-primary"),
        }
    }
}

/// Cart (checkout) page locators
#[derive(Debug, Clone)]
pub struct CartLocators {
    /// One cart row
    pub item_row: Selector,
    /// Name cell inside a row
    pub item_name: Selector,
    /// Price cell inside a row
    pub item_price: Selector,
    /// Displayed total
    pub total: Selector,
    /// "Pay with Card" button
    pub pay_button: Selector,
}

impl Default for CartLocators {
    fn default() -> Self {
        Self {
            item_row: Selector::css("table.table-striped tbody tr"),
            item_name: Selector::css("td:nth-child(1)"),
            item_price: Selector::css("td:nth-child(2)"),
            total: Selector::css("p#total"),
            pay_button: Selector::css("button.stripe-button-el"),
        }
    }
}

/// Embedded payment form locators
#[derive(Debug, Clone)]
pub struct PaymentLocators {
    /// The payment iframe
    pub frame: Selector,
    /// Email input
    pub email: Selector,
    /// Card number input
    pub card_number: Selector,
    /// Expiry input
    pub expiry: Selector,
    /// CVC input
    pub cvc: Selector,
    /// ZIP input (not always rendered)
    pub zip: Selector,
    /// Submit button
    pub submit: Selector,
    /// Confirmation banner (heading filtered by the success text)
    pub success_banner: Selector,
}

impl PaymentLocators {
    /// Locators for a given frame selector and success banner text
    #[must_use]
    pub fn new(frame: &str, success_text: &str) -> Self {
        Self {
            frame: Selector::css(frame),
            email: Selector::css("input[type='email']"),
            card_number: Selector::css("input[placeholder='Card number']"),
            expiry: Selector::css("input[placeholder='MM / YY']"),
            cvc: Selector::css("input[placeholder='CVC']"),
            zip: Selector::css("input[placeholder='ZIP Code']"),
            submit: Selector::css("button[type='submit']"),
            success_banner: Selector::css(PAGE_HEADING).with_text(success_text),
        }
    }
}

impl Default for PaymentLocators {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PAYMENT_FRAME, crate::config::DEFAULT_SUCCESS_TEXT)
    }
}
