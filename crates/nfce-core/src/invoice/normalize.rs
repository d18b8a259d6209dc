//! Brazilian number formatting and grouping keys.

use rust_decimal::{Decimal, RoundingStrategy};

use super::patterns::NON_DIGIT;

/// Parse a comma-decimal number (e.g., "12,50", "1.234,56", "3").
///
/// When a comma is present it is the decimal separator and dots are
/// thousands separators. Without a comma the text is read as-is. The whole
/// fragment must be numeric: trailing units such as "2 UN" are rejected
/// rather than read as a prefix.
pub fn parse_br_number(s: &str) -> Option<f64> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let normalized = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };

    // f64::from_str also accepts "inf" and "NaN"; page text never should.
    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    {
        return None;
    }

    normalized.parse::<f64>().ok()
}

/// Format with exactly two decimals and a comma separator ("12,50").
///
/// Rounds half away from zero on the exact binary value, so `1.125`
/// becomes `"1,13"` while `2.675` (stored as 2.67499...) stays `"2,67"`.
pub fn format_br_decimal(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // -0.0
    let value = if value == 0.0 { 0.0 } else { value };

    let fixed = match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.2}", rounded)
        }
        None => format!("{:.2}", value),
    };

    fixed.replace('.', ",")
}

/// Shortest decimal text for a quantity ("3", "1.5", "0.755").
///
/// Never switches to exponent notation, so `1e21` prints all its digits.
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    value.to_string()
}

/// Keep only ASCII digits ("Código: 123-45" -> "12345").
pub fn digits_only(s: &str) -> String {
    NON_DIGIT.replace_all(s, "").trim().to_string()
}

/// Remove the first occurrence of `label` and trim what is left.
pub fn strip_label(s: &str, label: &str) -> String {
    s.replacen(label, "", 1).trim().to_string()
}

/// Key under which rows of the same product are merged.
pub fn consolidation_key(title: &str, code: &str) -> String {
    format!("{}-{}", title, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_br_number() {
        assert_eq!(parse_br_number("12,50"), Some(12.5));
        assert_eq!(parse_br_number("1,000"), Some(1.0));
        assert_eq!(parse_br_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_br_number(" 7 "), Some(7.0));
        assert_eq!(parse_br_number("0.755"), Some(0.755));
        assert_eq!(parse_br_number("\u{a0}20,00"), Some(20.0));
    }

    #[test]
    fn test_parse_br_number_rejects_garbage() {
        assert_eq!(parse_br_number(""), None);
        assert_eq!(parse_br_number("   "), None);
        assert_eq!(parse_br_number("abc"), None);
        assert_eq!(parse_br_number("NaN"), None);
        assert_eq!(parse_br_number("inf"), None);
        assert_eq!(parse_br_number("R$ 3,00"), None);
    }

    #[test]
    fn test_parse_br_number_whole_fragment_only() {
        assert_eq!(parse_br_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_br_number("2 UN"), None);
        assert_eq!(parse_br_number("3,5 kg"), None);
        assert_eq!(parse_br_number("3,5kg"), None);
    }

    #[test]
    fn test_format_br_decimal() {
        assert_eq!(format_br_decimal(12.5), "12,50");
        assert_eq!(format_br_decimal(60.0), "60,00");
        assert_eq!(format_br_decimal(0.0), "0,00");
        assert_eq!(format_br_decimal(-0.0), "0,00");
        assert_eq!(format_br_decimal(1234.5678), "1234,57");
        assert_eq!(format_br_decimal(0.1 + 0.2), "0,30");
    }

    #[test]
    fn test_format_br_decimal_rounding() {
        assert_eq!(format_br_decimal(1.125), "1,13");
        assert_eq!(format_br_decimal(-1.125), "-1,13");
        assert_eq!(format_br_decimal(2.675), "2,67");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_br_decimal(f64::NAN), "NaN");
        assert_eq!(format_br_decimal(f64::INFINITY), "Infinity");
        assert_eq!(format_quantity(f64::NAN), "NaN");
    }

    #[test]
    fn test_round_trip() {
        let parsed = parse_br_number("12,50").unwrap();
        assert_eq!(parsed, 12.5);
        assert_eq!(format_br_decimal(parsed), "12,50");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(1.5), "1.5");
        assert_eq!(format_quantity(0.755), "0.755");
        assert_eq!(format_quantity(-0.0), "0");
    }

    #[test]
    fn test_format_quantity_extreme_magnitudes() {
        assert_eq!(format_quantity(1e21), "1000000000000000000000");
        assert_eq!(format_quantity(1e-7), "0.0000001");
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("Código: 123-45"), "12345");
        assert_eq!(digits_only("(Código: 7891234 )"), "7891234");
        assert_eq!(digits_only("sem código"), "");
    }

    #[test]
    fn test_strip_label() {
        assert_eq!(strip_label("Qtde.:2,000", "Qtde.:"), "2,000");
        assert_eq!(strip_label("Vl. Unit.:\u{a0}20,00", "Vl. Unit.:"), "20,00");
        assert_eq!(strip_label("Qtde.:Qtde.:1", "Qtde.:"), "Qtde.:1");
    }

    #[test]
    fn test_consolidation_key() {
        assert_eq!(consolidation_key("Arroz 5kg", "7891234"), "Arroz 5kg-7891234");
        assert_eq!(consolidation_key("", ""), "-");
    }
}
