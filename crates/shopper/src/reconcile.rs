//! Cart reconciliation: totals and item membership.
//!
//! Pure functions over data already read from the page, so they can be
//! checked without a browser.

use crate::result::{ShopperError, ShopperResult};
use crate::text::normalize_product_name;
use serde::{Deserialize, Serialize};

/// One row of the cart table, as read right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Displayed name
    pub name: String,
    /// Displayed price
    pub price: u32,
}

impl CartItem {
    /// Create a cart item
    #[must_use]
    pub fn new(name: impl Into<String>, price: u32) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Check the displayed total against the sum of item prices.
///
/// Returns the verified total.
pub fn reconcile(items: &[CartItem], displayed_total: u32) -> ShopperResult<u32> {
    let expected = items
        .iter()
        .try_fold(0u32, |acc, item| acc.checked_add(item.price))
        .ok_or_else(|| ShopperError::invariant("cart prices overflow u32"))?;

    if expected == displayed_total {
        Ok(expected)
    } else {
        Err(ShopperError::TotalMismatch {
            expected,
            actual: displayed_total,
        })
    }
}

/// Every expected name must be contained in some actual name after
/// normalisation. Containment, not equality: the page may decorate names.
pub fn verify_names<S: AsRef<str>>(expected: &[S], actual: &[String]) -> ShopperResult<()> {
    let normalized: Vec<String> = actual.iter().map(|n| normalize_product_name(n)).collect();

    let missing: Vec<String> = expected
        .iter()
        .map(|s| s.as_ref())
        .filter(|name| {
            let needle = normalize_product_name(name);
            !normalized.iter().any(|have| have.contains(&needle))
        })
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShopperError::Mismatch {
            missing,
            actual: actual.to_vec(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod reconcile_tests {
        use super::*;

        #[test]
        fn test_matching_total() {
            let items = [CartItem::new("a", 100), CartItem::new("b", 250)];
            assert_eq!(reconcile(&items, 350).unwrap(), 350);
        }

        #[test]
        fn test_mismatch_carries_both_values() {
            let items = [CartItem::new("a", 100), CartItem::new("b", 250)];
            match reconcile(&items, 340) {
                Err(ShopperError::TotalMismatch { expected, actual }) => {
                    assert_eq!(expected, 350);
                    assert_eq!(actual, 340);
                }
                other => panic!("expected TotalMismatch, got {other:?}"),
            }
        }

        #[test]
        fn test_empty_cart_totals_zero() {
            assert_eq!(reconcile(&[], 0).unwrap(), 0);
        }

        #[test]
        fn test_overflow_is_invariant_violation() {
            let items = [CartItem::new("a", u32::MAX), CartItem::new("b", 1)];
            assert_eq!(reconcile(&items, 0).unwrap_err().kind(), "invariant_violation");
        }
    }

    mod verify_names_tests {
        use super::*;

        #[test]
        fn test_normalized_containment() {
            let actual = vec!["ALOE  -  Moisturizer Cream".to_string()];
            assert!(verify_names(&["Aloe Moisturizer"], &actual).is_ok());
        }

        #[test]
        fn test_reports_missing_names() {
            let actual = vec!["Aloe Body Lotion".to_string()];
            match verify_names(&["Aloe", "Almond"], &actual) {
                Err(ShopperError::Mismatch { missing, actual }) => {
                    assert_eq!(missing, vec!["Almond".to_string()]);
                    assert_eq!(actual, vec!["Aloe Body Lotion".to_string()]);
                }
                other => panic!("expected Mismatch, got {other:?}"),
            }
        }

        #[test]
        fn test_empty_expectation_passes() {
            let expected: [&str; 0] = [];
            assert!(verify_names(&expected, &[]).is_ok());
        }

        #[test]
        fn test_spf_hyphen_drift() {
            let actual = vec!["Vassily SPF 50 Sunscreen".to_string()];
            assert!(verify_names(&["SPF-50"], &actual).is_ok());
        }
    }

    proptest! {
        #[test]
        fn prop_reconcile_accepts_exact_sum(prices in proptest::collection::vec(0u32..10_000, 0..8)) {
            let items: Vec<CartItem> = prices.iter().map(|p| CartItem::new("x", *p)).collect();
            let sum: u32 = prices.iter().sum();
            prop_assert_eq!(reconcile(&items, sum).unwrap(), sum);
        }

        #[test]
        fn prop_reconcile_rejects_any_other_total(
            prices in proptest::collection::vec(0u32..10_000, 0..8),
            delta in 1u32..1_000,
        ) {
            let items: Vec<CartItem> = prices.iter().map(|p| CartItem::new("x", *p)).collect();
            let sum: u32 = prices.iter().sum();
            prop_assert!(reconcile(&items, sum + delta).is_err());
        }
    }
}
