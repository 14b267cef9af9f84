//! Rendering of derived values into form-field text.
//!
//! Non-positive values render as an empty field, which the form reads as
//! "not computed yet" rather than a legitimate zero.

/// `Some(value)` when positive, otherwise the empty sentinel.
pub fn blank_if_nonpositive(value: i64) -> Option<i64> {
    (value > 0).then_some(value)
}

/// Same sentinel for areas.
pub fn blank_area(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Thousands-separated amount, e.g. `179,895,000`. Empty for the sentinel.
pub fn format_amount(value: Option<i64>) -> String {
    let Some(value) = value.filter(|v| *v > 0) else {
        return String::new();
    };
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Shortest decimal rendering of an area. Empty for the sentinel.
pub fn format_area(value: Option<f64>) -> String {
    match value.and_then(blank_area) {
        Some(v) => format!("{v}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_get_separators() {
        assert_eq!(format_amount(Some(1)), "1");
        assert_eq!(format_amount(Some(999)), "999");
        assert_eq!(format_amount(Some(1000)), "1,000");
        assert_eq!(format_amount(Some(179_895_000)), "179,895,000");
        assert_eq!(format_amount(Some(1_234_567_890)), "1,234,567,890");
    }

    #[test]
    fn sentinel_is_empty() {
        assert_eq!(format_amount(None), "");
        assert_eq!(format_amount(Some(0)), "");
        assert_eq!(format_amount(Some(-5)), "");
        assert_eq!(blank_if_nonpositive(0), None);
        assert_eq!(blank_if_nonpositive(7), Some(7));
    }

    #[test]
    fn areas() {
        assert_eq!(format_area(Some(35.979)), "35.979");
        assert_eq!(format_area(Some(10.0)), "10");
        assert_eq!(format_area(Some(0.0)), "");
        assert_eq!(format_area(None), "");
    }
}
