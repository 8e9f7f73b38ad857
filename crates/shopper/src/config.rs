//! Run configuration.
//!
//! Everything the site owns (URL, banner text, test card data) is treated as
//! opaque configuration. Files are YAML; every section has defaults so an
//! empty file is a valid configuration.

use crate::result::{ShopperError, ShopperResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default site under test
pub const DEFAULT_BASE_URL: &str = "https://weathershopper.pythonanywhere.com/";

/// Default payment iframe selector
pub const DEFAULT_PAYMENT_FRAME: &str = "iframe[name='stripe_checkout_app']";

/// Default confirmation banner text
pub const DEFAULT_SUCCESS_TEXT: &str = "PAYMENT SUCCESS";

/// Site section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Home page URL (product and cart URLs hang off it)
    pub base_url: String,
    /// Selector of the embedded payment frame
    pub payment_frame: String,
    /// Text of the confirmation banner
    pub success_text: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            payment_frame: DEFAULT_PAYMENT_FRAME.to_string(),
            success_text: DEFAULT_SUCCESS_TEXT.to_string(),
        }
    }
}

/// Timeouts in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Element visibility / enablement
    pub element_ms: u64,
    /// URL + heading postconditions after a click
    pub navigation_ms: u64,
    /// Payment iframe to become usable
    pub frame_ms: u64,
    /// Cart counter to increase after "Add"
    pub cart_update_ms: u64,
    /// Optional form fields (zip)
    pub optional_field_ms: u64,
    /// Network idle after page changes
    pub network_idle_ms: u64,
    /// Polling interval for bounded waits
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_ms: 5_000,
            navigation_ms: 30_000,
            frame_ms: 10_000,
            cart_update_ms: 5_000,
            optional_field_ms: 2_000,
            network_idle_ms: 5_000,
            poll_interval_ms: 50,
        }
    }
}

impl Timeouts {
    /// Same timeout everywhere (handy for fast fakes)
    #[must_use]
    pub const fn uniform(ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            element_ms: ms,
            navigation_ms: ms,
            frame_ms: ms,
            cart_update_ms: ms,
            optional_field_ms: ms,
            network_idle_ms: ms,
            poll_interval_ms,
        }
    }

    /// Wait options bounded by `timeout_ms`, polling at the configured interval
    #[must_use]
    pub const fn wait(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new(timeout_ms, self.poll_interval_ms)
    }
}

/// Browser section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Browser engine name; only "chromium" is supported
    pub engine: String,
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            engine: "chromium".to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

/// Test card details typed into the payment form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDetails {
    /// Email
    pub email: String,
    /// Card number
    pub card_number: String,
    /// Expiry month (MM)
    pub expiry_month: String,
    /// Expiry year (YY)
    pub expiry_year: String,
    /// CVC
    pub cvc: String,
    /// ZIP code, typed only when the form shows the field
    pub zip: Option<String>,
}

impl Default for PaymentDetails {
    fn default() -> Self {
        Self {
            email: "test@example.com".to_string(),
            card_number: "4242424242424242".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "30".to_string(),
            cvc: "123".to_string(),
            zip: Some("12345".to_string()),
        }
    }
}

impl PaymentDetails {
    /// Expiry as typed into the "MM / YY" field
    #[must_use]
    pub fn expiry(&self) -> String {
        format!("{}{}", self.expiry_month, self.expiry_year)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopperConfig {
    /// Site under test
    pub site: SiteConfig,
    /// Wait bounds
    pub timeouts: Timeouts,
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Card details
    pub payment: PaymentDetails,
    /// Where failure screenshots / DOM dumps go
    pub artifacts_dir: PathBuf,
    /// Where log files go
    pub log_dir: PathBuf,
}

impl Default for ShopperConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            timeouts: Timeouts::default(),
            browser: BrowserSettings::default(),
            payment: PaymentDetails::default(),
            artifacts_dir: PathBuf::from("errors"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl ShopperConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML text; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> ShopperResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| ShopperError::config(e.to_string()))
    }

    /// Load from a YAML file, or defaults when `path` is None
    pub fn load(path: Option<&Path>) -> ShopperResult<Self> {
        match path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|e| {
                    ShopperError::config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_yaml_str(&yaml)
            }
            None => Ok(Self::new()),
        }
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> ShopperResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| ShopperError::config(e.to_string()))
    }

    /// Check the values a run depends on
    pub fn validate(&self) -> ShopperResult<()> {
        let url = &self.site.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ShopperError::config(format!(
                "site.base_url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.site.success_text.trim().is_empty() {
            return Err(ShopperError::config("site.success_text is empty"));
        }
        let t = &self.timeouts;
        if [
            t.element_ms,
            t.navigation_ms,
            t.frame_ms,
            t.cart_update_ms,
            t.optional_field_ms,
            t.network_idle_ms,
        ]
        .contains(&0)
        {
            return Err(ShopperError::config("timeouts must be greater than zero"));
        }
        if t.poll_interval_ms == 0 || t.poll_interval_ms > t.element_ms {
            return Err(ShopperError::config(
                "timeouts.poll_interval_ms must be in 1..=element_ms",
            ));
        }
        if !self.browser.engine.eq_ignore_ascii_case("chromium") {
            return Err(ShopperError::config(format!(
                "unsupported browser engine {:?} (only chromium is available)",
                self.browser.engine
            )));
        }
        let p = &self.payment;
        for (field, value) in [
            ("email", &p.email),
            ("card_number", &p.card_number),
            ("expiry_month", &p.expiry_month),
            ("expiry_year", &p.expiry_year),
            ("cvc", &p.cvc),
        ] {
            if value.trim().is_empty() {
                return Err(ShopperError::config(format!("payment.{field} is empty")));
            }
        }
        Ok(())
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.site.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    /// Set timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Set the success banner text
    #[must_use]
    pub fn with_success_text(mut self, text: impl Into<String>) -> Self {
        self.site.success_text = text.into();
        self
    }

    /// URL of a page below the base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.site.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_new_has_paths_and_site() {
            let config = ShopperConfig::new();
            assert_eq!(config.site.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.artifacts_dir, PathBuf::from("errors"));
            assert_eq!(config.log_dir, PathBuf::from("logs"));
            assert_eq!(config.timeouts.navigation_ms, 30_000);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_expiry_concatenates() {
            let details = PaymentDetails::default();
            assert_eq!(details.expiry(), "1230");
        }

        #[test]
        fn test_url_for_joins_without_double_slash() {
            let config = ShopperConfig::new().with_base_url("http://shop.test/");
            assert_eq!(config.url_for("cart"), "http://shop.test/cart");
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_empty_yaml_is_default() {
            let config = ShopperConfig::from_yaml_str("{}").unwrap();
            assert_eq!(config, ShopperConfig::new());
        }

        #[test]
        fn test_partial_yaml_overrides() {
            let yaml = "site:\n  base_url: http://localhost:8000/\ntimeouts:\n  element_ms: 1500\nbrowser:\n  headless: false\n";
            let config = ShopperConfig::from_yaml_str(yaml).unwrap();
            assert_eq!(config.site.base_url, "http://localhost:8000/");
            assert_eq!(config.site.success_text, DEFAULT_SUCCESS_TEXT);
            assert_eq!(config.timeouts.element_ms, 1500);
            assert_eq!(config.timeouts.navigation_ms, 30_000);
            assert!(!config.browser.headless);
        }

        #[test]
        fn test_invalid_yaml_is_config_error() {
            let err = ShopperConfig::from_yaml_str("site: [unclosed").unwrap_err();
            assert_eq!(err.kind(), "config");
        }

        #[test]
        fn test_yaml_round_trip_keeps_values() {
            let config = ShopperConfig::new().with_success_text("Your payment was successful");
            let yaml = config.to_yaml().unwrap();
            let back = ShopperConfig::from_yaml_str(&yaml).unwrap();
            assert_eq!(back.site.success_text, "Your payment was successful");
        }

        #[test]
        fn test_load_missing_file() {
            let err = ShopperConfig::load(Some(Path::new("/nonexistent/shopper.yaml"))).unwrap_err();
            assert!(err.to_string().contains("cannot read"));
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_rejects_non_http_url() {
            let config = ShopperConfig::new().with_base_url("ftp://nope");
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_rejects_zero_timeout() {
            let mut config = ShopperConfig::new();
            config.timeouts.frame_ms = 0;
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_rejects_other_engines() {
            let mut config = ShopperConfig::new();
            config.browser.engine = "webkit".into();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("webkit"));
        }

        #[test]
        fn test_rejects_empty_card() {
            let mut config = ShopperConfig::new();
            config.payment.card_number = "  ".into();
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_zip_is_optional() {
            let mut config = ShopperConfig::new();
            config.payment.zip = None;
            assert!(config.validate().is_ok());
        }
    }
}
