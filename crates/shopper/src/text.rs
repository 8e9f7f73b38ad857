//! Text helpers shared by the page objects.

use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn unsigned_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static pattern"))
}

/// First run of digits in `text`. Signs are not part of the run, so
/// `"-4 ℃"` reads as 4.
///
/// ```
/// use weather_shopper::text::extract_number;
/// assert_eq!(extract_number("23 ℃"), Some(23));
/// assert_eq!(extract_number("-4 ℃"), Some(4));
/// assert_eq!(extract_number("no reading"), None);
/// ```
#[must_use]
pub fn extract_number(text: &str) -> Option<i32> {
    unsigned_number()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// First run of digits as an amount (prices, totals, counters)
///
/// ```
/// use weather_shopper::text::extract_amount;
/// assert_eq!(extract_amount("Price: Rs. 216"), Some(216));
/// assert_eq!(extract_amount("Empty"), None);
/// ```
#[must_use]
pub fn extract_amount(text: &str) -> Option<u32> {
    unsigned_number()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Lowercase, hyphens to spaces, whitespace runs collapsed, trimmed
///
/// ```
/// use weather_shopper::text::normalize_product_name;
/// assert_eq!(
///     normalize_product_name("ALOE  -  Moisturizer Cream"),
///     "aloe moisturizer cream"
/// );
/// ```
#[must_use]
pub fn normalize_product_name(name: &str) -> String {
    name.to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_number_first_run_only() {
        assert_eq!(extract_number("12 then 34"), Some(12));
    }

    #[test]
    fn test_extract_number_ignores_detached_minus() {
        assert_eq!(extract_number("SPF - 30"), Some(30));
    }

    #[test]
    fn test_extract_number_reads_digits_after_minus() {
        assert_eq!(extract_number("-40 ℃"), Some(40));
    }

    #[test]
    fn test_extract_number_overflow_is_none() {
        assert_eq!(extract_number("99999999999999"), None);
    }

    #[test]
    fn test_extract_amount_never_negative() {
        assert_eq!(extract_amount("Total: -5"), Some(5));
    }

    #[test]
    fn test_extract_amount_cart_counter() {
        assert_eq!(extract_amount("2 item(s)"), Some(2));
    }

    #[test]
    fn test_normalize_collapses_hyphenated_names() {
        assert_eq!(
            normalize_product_name("SPF-50 Sunscreen"),
            normalize_product_name("spf 50  sunscreen")
        );
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_product_name("  Almond  "), "almond");
    }
}
