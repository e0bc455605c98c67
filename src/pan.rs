//! PAN parsing
//!
//! Two entry points:
//! - [`parse_strict`]: the HTTP surface. A PAN is a signed decimal integer,
//!   anything else is rejected.
//! - [`coerce`]: compatibility path for string keys. Short PANs are
//!   right-padded with zeros to 16 digits, long ones keep their first 16.

/// Canonical PAN width used by [`coerce`].
pub const CANONICAL_PAN_DIGITS: usize = 16;

/// Prefix of every lookup cache key.
pub const LOOKUP_KEY_PREFIX: &str = "look_up_";

/// Cache key for a PAN: `"look_up_" + decimal(pan)`.
pub fn lookup_key(pan: u64) -> String {
    format!("{}{}", LOOKUP_KEY_PREFIX, pan)
}

/// Parse a query-string PAN. Negative values parse; callers treat them as
/// "not found". Surrounding whitespace is not accepted.
pub fn parse_strict(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

/// Lossy 16-digit coercion.
///
/// `"4111"` becomes `4111000000000000`; `"41111111111111112222"` becomes
/// `4111111111111111`. Non-digit input yields `None`.
pub fn coerce(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let canonical = if raw.len() < CANONICAL_PAN_DIGITS {
        format!("{:0<width$}", raw, width = CANONICAL_PAN_DIGITS)
    } else {
        raw[..CANONICAL_PAN_DIGITS].to_string()
    };
    canonical.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_key() {
        assert_eq!(lookup_key(1234567890123456), "look_up_1234567890123456");
        assert_eq!(lookup_key(0), "look_up_0");
    }

    #[test]
    fn test_parse_strict() {
        assert_eq!(parse_strict("1234567890123456"), Some(1234567890123456));
        assert_eq!(parse_strict("42"), Some(42));
        assert_eq!(parse_strict(" 42 "), None);
        assert_eq!(parse_strict("42\n"), None);
        assert_eq!(parse_strict("-7"), Some(-7));
        assert_eq!(parse_strict("12ab"), None);
        assert_eq!(parse_strict(""), None);
        assert_eq!(parse_strict("99999999999999999999"), None);
    }

    #[test]
    fn test_coerce_pads_short_pan() {
        assert_eq!(coerce("4111"), Some(4111000000000000));
        assert_eq!(coerce("1"), Some(1000000000000000));
    }

    #[test]
    fn test_coerce_truncates_long_pan() {
        assert_eq!(coerce("4111111111111111"), Some(4111111111111111));
        assert_eq!(coerce("4111111111111111999"), Some(4111111111111111));
    }

    #[test]
    fn test_coerce_rejects_non_digits() {
        assert_eq!(coerce(""), None);
        assert_eq!(coerce("4111-1111"), None);
        assert_eq!(coerce("-4111"), None);
    }
}
