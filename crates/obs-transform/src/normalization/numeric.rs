//! Numeric normalization utilities.

/// Parses a string as f64, returning None for invalid, empty or non-finite values.
///
/// A single decimal comma is accepted (`"4,5"` -> `4.5`).
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) if !trimmed.contains('.') && trimmed.matches(',').count() == 1 => {
            trimmed.replace(',', ".").parse::<f64>().ok()?
        }
        Err(_) => return None,
    };
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("42"), Some(42.0));
        assert_eq!(parse_f64(" 42.5 "), Some(42.5));
        assert_eq!(parse_f64("4,5"), Some(4.5));
        assert_eq!(parse_f64("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_f64_invalid() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("   "), None);
        assert_eq!(parse_f64("quarenta"), None);
        assert_eq!(parse_f64("1,000,5"), None);
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
    }
}
