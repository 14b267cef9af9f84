//! Total numeric readers for registry and form values.
//!
//! Registries and form fields hand over numbers as text ("84.97",
//! "1,250,000", "", "35.9790/36645.30"). Nothing here fails: unreadable
//! input is `None`, and callers decide what absent means.

/// Read the leading decimal number of `raw`.
///
/// Whitespace is trimmed and thousands separators are dropped before the
/// longest prefix of the form `[+-]digits[.digits][e[+-]digits]` is taken.
/// Trailing text after the number is ignored, so `"35.97/366"` reads as
/// `35.97` and `"84.97㎡"` as `84.97`. Returns `None` when no digits lead
/// the string or the value is not finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let prefix = decimal_prefix(&cleaned)?;
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest leading slice of `s` that is a plain decimal literal.
fn decimal_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // "12." is still 12
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}

/// Clamp to a finite, non-negative value.
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Round to 4 decimal places, half away from zero.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_decimals() {
        assert_eq!(parse_number("123.45"), Some(123.45));
        assert_eq!(parse_number("  7 "), Some(7.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("12."), Some(12.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(parse_number("1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_number("5,000,000원"), Some(5_000_000.0));
    }

    #[test]
    fn trailing_text_ignored() {
        assert_eq!(parse_number("35.9790/36645.30"), Some(35.979));
        assert_eq!(parse_number("84.97㎡"), Some(84.97));
        assert_eq!(parse_number("1e3x"), Some(1000.0));
        assert_eq!(parse_number("2e"), Some(2.0));
    }

    #[test]
    fn unreadable_is_none() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("/50"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1e400"), None);
    }

    #[test]
    fn clamp_and_round() {
        assert_eq!(non_negative(-1.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(2.5), 2.5);
        assert_eq!(round4(1.234_56), 1.2346);
        assert_eq!(round4(149.3029), 149.3029);
    }
}
