//! Brazilian-format number handling (`18.032,20`).

/// Parse a localized decimal: dot thousands separator, comma decimal separator.
///
/// Empty or malformed input yields `0.0` so that one bad field never aborts
/// a whole document.
pub fn parse_localized_decimal(s: &str) -> f64 {
    let normalized = s.trim().replace('.', "").replace(',', ".");
    if normalized.is_empty() {
        return 0.0;
    }
    normalized.parse().unwrap_or(0.0)
}

/// Format a value in Brazilian style (`18.032,20`).
pub fn format_localized_amount(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value.abs());
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (s.as_str(), None),
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if value < 0.0 && value.abs() >= 0.5 * 10f64.powi(-(decimals as i32)) {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    match decimal_part {
        Some(d) => format!("{},{}", formatted, d),
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_localized_decimal() {
        assert_eq!(parse_localized_decimal("18.032,20"), 18032.20);
        assert_eq!(parse_localized_decimal("0,12"), 0.12);
        assert_eq!(parse_localized_decimal(" 2.163,86 "), 2163.86);
        assert_eq!(parse_localized_decimal("1.234.567,891"), 1234567.891);
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        assert_eq!(parse_localized_decimal(""), 0.0);
        assert_eq!(parse_localized_decimal("   "), 0.0);
        assert_eq!(parse_localized_decimal("abc"), 0.0);
        assert_eq!(parse_localized_decimal("1,2,3"), 0.0);
    }

    #[test]
    fn test_format_localized_amount() {
        assert_eq!(format_localized_amount(18032.2, 2), "18.032,20");
        assert_eq!(format_localized_amount(2163.86, 2), "2.163,86");
        assert_eq!(format_localized_amount(0.0, 2), "0,00");
        assert_eq!(format_localized_amount(1234567.0, 0), "1.234.567");
        assert_eq!(format_localized_amount(-1500.5, 2), "-1.500,50");
    }
}
