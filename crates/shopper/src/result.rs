//! Result and error types for the Weather Shopper workflow.

use thiserror::Error;

/// Result type for workflow, page and driver operations
pub type ShopperResult<T> = Result<T, ShopperError>;

/// Errors that can occur while driving the Weather Shopper site
#[derive(Debug, Error)]
pub enum ShopperError {
    /// Home page did not load
    #[error("Failed to load {url}: {message}")]
    Load {
        /// URL that was requested
        url: String,
        /// Error message
        message: String,
    },

    /// Text was read but held no number
    #[error("No number in {selector} text {text:?}")]
    Extract {
        /// Selector the text was read from
        selector: String,
        /// The text that was read
        text: String,
    },

    /// URL or heading postcondition unmet after a navigation
    #[error("Navigation to {expected} failed at {actual_url}: {message}")]
    Navigation {
        /// Expected page (URL fragment / heading)
        expected: String,
        /// URL the browser was on when the check gave up
        actual_url: String,
        /// Error message
        message: String,
    },

    /// No product matched a criterion
    #[error("No product matching {criterion:?}")]
    NotFound {
        /// Search criterion
        criterion: String,
    },

    /// Cart counter did not increase after activating a product
    #[error("Adding {product:?} to cart failed: counter went {before} -> {after}")]
    AddFailed {
        /// Product name
        product: String,
        /// Counter before the click
        before: u32,
        /// Counter after the bounded wait
        after: u32,
    },

    /// Expected cart items are missing
    #[error("Cart is missing {missing:?} (cart holds {actual:?})")]
    Mismatch {
        /// Expected names with no match in the cart
        missing: Vec<String>,
        /// Names actually displayed in the cart
        actual: Vec<String>,
    },

    /// Displayed total differs from the sum of item prices
    #[error("Cart total mismatch: items sum to {expected}, page shows {actual}")]
    TotalMismatch {
        /// Sum of the per-item prices
        expected: u32,
        /// Total displayed by the page
        actual: u32,
    },

    /// Required payment field missing or unfillable
    #[error("Payment form field {field}: {message}")]
    Form {
        /// Field name
        field: String,
        /// Error message
        message: String,
    },

    /// Payment confirmation page not reached
    #[error("Payment not confirmed at {url}: {message}")]
    PaymentNotConfirmed {
        /// URL after submission
        url: String,
        /// Error message
        message: String,
    },

    /// Selector matched nothing
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Handle belongs to an earlier document
    #[error("Stale element handle {id} from epoch {epoch}")]
    StaleElement {
        /// Handle id
        id: u64,
        /// Epoch the handle was created in
        epoch: u64,
    },

    /// Bounded wait expired
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        condition: String,
    },

    /// Browser driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// A stage ran before its input was published
    #[error("Stage {stage} needs {field}, which is not set")]
    MissingState {
        /// Session field
        field: &'static str,
        /// Stage that asked for it
        stage: &'static str,
    },

    /// Workflow invariant broken (double write, out-of-order transition)
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShopperError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a payment form error
    #[must_use]
    pub fn form(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Form {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invariant violation
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Extract { .. } => "extract",
            Self::Navigation { .. } => "navigation",
            Self::NotFound { .. } => "not_found",
            Self::AddFailed { .. } => "add_failed",
            Self::Mismatch { .. } => "mismatch",
            Self::TotalMismatch { .. } => "total_mismatch",
            Self::Form { .. } => "form",
            Self::PaymentNotConfirmed { .. } => "payment_not_confirmed",
            Self::ElementNotFound { .. } => "element_not_found",
            Self::StaleElement { .. } => "stale_element",
            Self::Timeout { .. } => "timeout",
            Self::Driver { .. } => "driver",
            Self::BrowserLaunch { .. } => "browser_launch",
            Self::MissingState { .. } => "missing_state",
            Self::InvariantViolation { .. } => "invariant_violation",
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Whether the error is an absent element (used for optional fields)
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Whether a lookup may succeed if retried: the element is not there
    /// yet, belongs to a replaced document, or the page's execution context
    /// went away mid-navigation.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::StaleElement { .. } | Self::Driver { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_total_mismatch_message_carries_both_values() {
        let err = ShopperError::TotalMismatch {
            expected: 350,
            actual: 340,
        };
        let msg = err.to_string();
        assert!(msg.contains("350"));
        assert!(msg.contains("340"));
        assert_eq!(err.kind(), "total_mismatch");
    }

    #[test]
    fn test_form_constructor() {
        let err = ShopperError::form("cvc", "not visible");
        assert!(err.to_string().contains("cvc"));
        assert_eq!(err.kind(), "form");
    }

    #[test]
    fn test_is_not_found() {
        let err = ShopperError::ElementNotFound {
            selector: "input".into(),
        };
        assert!(err.is_not_found());
        assert!(!ShopperError::driver("boom").is_not_found());
    }

    #[test]
    fn test_is_transient() {
        assert!(ShopperError::driver("context destroyed").is_transient());
        assert!(ShopperError::StaleElement { id: 1, epoch: 0 }.is_transient());
        assert!(!ShopperError::config("bad").is_transient());
        assert!(!ShopperError::Timeout {
            ms: 10,
            condition: "x".into()
        }
        .is_transient());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ShopperError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
