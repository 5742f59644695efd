//! Field normalization for loosely-typed numeric form values.
//!
//! Users type quotas with unit suffixes ("2TB", "500 GB", "10,000"); the bot
//! expects bare numbers. Failures never escape this boundary — callers get
//! `None` and apply their own recovery policy.

/// Strip everything that is not a digit or decimal point and parse the rest
/// as a float. `None` on empty input or when nothing parseable remains.
pub fn normalize_quantity(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// Strip every non-digit character and parse the rest as an integer.
/// Same `None`-on-failure policy as [`normalize_quantity`].
pub fn normalize_integer(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    let cleaned: String = raw.chars().filter(char::is_ascii_digit).collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_strips_unit_suffix() {
        assert_eq!(normalize_quantity(Some("2TB")), Some(2.0));
        assert_eq!(normalize_quantity(Some("500 GB")), Some(500.0));
    }

    #[test]
    fn quantity_keeps_decimal_point() {
        assert_eq!(normalize_quantity(Some("1.5TB")), Some(1.5));
    }

    #[test]
    fn quantity_none_on_absent_or_empty() {
        assert_eq!(normalize_quantity(None), None);
        assert_eq!(normalize_quantity(Some("")), None);
        assert_eq!(normalize_quantity(Some("   ")), None);
    }

    #[test]
    fn quantity_none_when_nothing_parseable_remains() {
        assert_eq!(normalize_quantity(Some("unlimited")), None);
        assert_eq!(normalize_quantity(Some("1.2.3")), None);
    }

    #[test]
    fn integer_strips_separators() {
        assert_eq!(normalize_integer(Some("10,000")), Some(10_000));
        assert_eq!(normalize_integer(Some("250000 files")), Some(250_000));
    }

    #[test]
    fn integer_drops_decimal_point() {
        // "1.5" strips to "15" — integers have no fractional part to keep
        assert_eq!(normalize_integer(Some("1.5")), Some(15));
    }

    #[test]
    fn integer_none_on_failure() {
        assert_eq!(normalize_integer(None), None);
        assert_eq!(normalize_integer(Some("")), None);
        assert_eq!(normalize_integer(Some("n/a")), None);
    }
}
