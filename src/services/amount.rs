use std::sync::LazyLock;

use regex::Regex;

/// Longest leading decimal literal, the way a lenient float parser reads it.
static LEADING_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid amount pattern")
});

/// Normalize a receipt amount such as `"12,50"` or `"12.50"` into a number.
///
/// The first comma is treated as the decimal separator. Anything that does not
/// start with a decimal literal (including `None` and `""`) normalizes to `0`,
/// so OCR noise never fails an aggregation; it only under-counts.
pub fn normalize_amount(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let dotted = raw.replacen(',', ".", 1);
    let trimmed = dotted.trim_start();

    LEADING_DECIMAL
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(normalize_amount(Some("12,50")), 12.5);
        assert_eq!(normalize_amount(Some("4,56")), 4.56);
    }

    #[test]
    fn test_dot_decimal_separator() {
        assert_eq!(normalize_amount(Some("12.50")), 12.5);
        assert_eq!(normalize_amount(Some("-3.25")), -3.25);
    }

    #[test]
    fn test_empty_and_missing() {
        assert_eq!(normalize_amount(Some("")), 0.0);
        assert_eq!(normalize_amount(Some("   ")), 0.0);
        assert_eq!(normalize_amount(None), 0.0);
    }

    #[test]
    fn test_only_first_comma_is_replaced() {
        // "1.234,56" -> "1.234.56" which reads as 1.234
        assert_eq!(normalize_amount(Some("1.234,56")), 1.234);
        // "1,234,56" -> "1.234,56" which reads as 1.234
        assert_eq!(normalize_amount(Some("1,234,56")), 1.234);
    }

    #[test]
    fn test_garbage_is_zero() {
        assert_eq!(normalize_amount(Some("abc")), 0.0);
        assert_eq!(normalize_amount(Some("€12")), 0.0);
        assert_eq!(normalize_amount(Some("NaN")), 0.0);
        assert_eq!(normalize_amount(Some("inf")), 0.0);
    }

    #[test]
    fn test_trailing_text_is_ignored() {
        assert_eq!(normalize_amount(Some("12,50 EUR")), 12.5);
        assert_eq!(normalize_amount(Some("  7.5€")), 7.5);
    }

    #[test]
    fn test_idempotent_on_normalized_output() {
        for raw in ["12,50", "0.1", "1e3", "-0,07", "", "x", "99.999"] {
            let once = normalize_amount(Some(raw));
            let twice = normalize_amount(Some(&once.to_string()));
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}
