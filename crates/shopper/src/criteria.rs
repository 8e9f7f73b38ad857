//! Temperature → product category policy.
//!
//! | Temperature | Category    |
//! |-------------|-------------|
//! | `t <= 34`   | Moisturizer |
//! | `t > 34`    | Sunscreen   |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Above this the shopper buys sunscreens
pub const SUNSCREEN_ABOVE: i32 = 34;

/// Product family offered by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    /// Moisturizers page
    Moisturizer,
    /// Sunscreens page
    Sunscreen,
}

impl ProductCategory {
    /// URL fragment of the category's listing page
    #[must_use]
    pub const fn url_part(self) -> &'static str {
        match self {
            Self::Moisturizer => "moisturizer",
            Self::Sunscreen => "sunscreen",
        }
    }

    /// Heading shown on the listing page
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Moisturizer => "Moisturizers",
            Self::Sunscreen => "Sunscreens",
        }
    }

    /// Text of the home page button leading to the category
    #[must_use]
    pub const fn buy_button_text(self) -> &'static str {
        match self {
            Self::Moisturizer => "Buy moisturizers",
            Self::Sunscreen => "Buy sunscreens",
        }
    }

    /// Name fragments of the two products to buy, cheapest of each
    #[must_use]
    pub const fn acquisitions(self) -> [&'static str; 2] {
        match self {
            Self::Moisturizer => ["Aloe", "Almond"],
            Self::Sunscreen => ["SPF-50", "SPF-30"],
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_part())
    }
}

/// Pick the category for a temperature in °C
#[must_use]
pub const fn select_category(temperature: i32) -> ProductCategory {
    if temperature > SUNSCREEN_ABOVE {
        ProductCategory::Sunscreen
    } else {
        // Below 19 and the 19..=34 band both default to moisturizers.
        ProductCategory::Moisturizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod boundary_tests {
        use super::*;

        #[test]
        fn test_cold_is_moisturizer() {
            assert_eq!(select_category(18), ProductCategory::Moisturizer);
            assert_eq!(select_category(-10), ProductCategory::Moisturizer);
        }

        #[test]
        fn test_mild_band_defaults_to_moisturizer() {
            assert_eq!(select_category(19), ProductCategory::Moisturizer);
            assert_eq!(select_category(25), ProductCategory::Moisturizer);
            assert_eq!(select_category(SUNSCREEN_ABOVE), ProductCategory::Moisturizer);
        }

        #[test]
        fn test_hot_is_sunscreen() {
            assert_eq!(select_category(35), ProductCategory::Sunscreen);
            assert_eq!(select_category(i32::MAX), ProductCategory::Sunscreen);
        }
    }

    mod category_tests {
        use super::*;

        #[test]
        fn test_site_facts() {
            assert_eq!(ProductCategory::Moisturizer.url_part(), "moisturizer");
            assert_eq!(ProductCategory::Sunscreen.heading(), "Sunscreens");
            assert_eq!(
                ProductCategory::Sunscreen.buy_button_text(),
                "Buy sunscreens"
            );
        }

        #[test]
        fn test_acquisitions_are_fixed() {
            assert_eq!(ProductCategory::Moisturizer.acquisitions(), ["Aloe", "Almond"]);
            assert_eq!(ProductCategory::Sunscreen.acquisitions(), ["SPF-50", "SPF-30"]);
        }

        #[test]
        fn test_serialize_lowercase() {
            let json = serde_json::to_string(&ProductCategory::Sunscreen).unwrap_or_default();
            assert_eq!(json, "\"sunscreen\"");
        }
    }

    proptest! {
        #[test]
        fn prop_total_and_threshold_exact(t in any::<i32>()) {
            let category = select_category(t);
            prop_assert_eq!(category == ProductCategory::Sunscreen, t > SUNSCREEN_ABOVE);
        }
    }
}
