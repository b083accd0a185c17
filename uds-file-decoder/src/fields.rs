//! Field parsing helpers
//!
//! Numeric fields tolerate surrounding whitespace. Everything here returns
//! `Option`; whether a missing value is an error is up to the caller.

/// Parse an unsigned decimal field
pub fn parse_u32(field: &str) -> Option<u32> {
    field.trim().parse().ok()
}

/// Parse a floating point field
pub fn parse_f64(field: &str) -> Option<f64> {
    field.trim().parse().ok()
}

/// Parse a signed range bound, decimal or `0x` hexadecimal
pub fn parse_i32_bound(field: &str) -> Option<i32> {
    let field = field.trim();
    let (negative, digits) = match field.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, field.strip_prefix('+').unwrap_or(field)),
    };

    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        // Hex text is the two's complement bit pattern, as in 0xFFFFFFFF == -1
        let bits = u32::from_str_radix(hex, 16).ok()? as i32;
        return Some(if negative { bits.checked_neg()? } else { bits });
    }

    field.parse().ok()
}

/// Field at `index`, or `""` if the row is shorter
pub fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("42"), Some(42));
        assert_eq!(parse_u32(" 7 "), Some(7));
        assert_eq!(parse_u32("+3"), Some(3));
        assert_eq!(parse_u32(""), None);
        assert_eq!(parse_u32("-1"), None);
        assert_eq!(parse_u32("4294967296"), None);
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("0.5"), Some(0.5));
        assert_eq!(parse_f64("-40"), Some(-40.0));
        assert_eq!(parse_f64("1e3"), Some(1000.0));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("abc"), None);
    }

    #[test]
    fn test_parse_i32_bound() {
        assert_eq!(parse_i32_bound("-5"), Some(-5));
        assert_eq!(parse_i32_bound("0x10"), Some(16));
        assert_eq!(parse_i32_bound("0xFFFFFFFF"), Some(-1));
        assert_eq!(parse_i32_bound("-0x10"), Some(-16));
        assert_eq!(parse_i32_bound(""), None);
        assert_eq!(parse_i32_bound("2147483648"), None);
    }

    #[test]
    fn test_field_out_of_range() {
        let row = vec!["a".to_string()];
        assert_eq!(field(&row, 0), "a");
        assert_eq!(field(&row, 5), "");
    }
}
