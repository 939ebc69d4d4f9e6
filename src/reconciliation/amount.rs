//! Statement amount normalization
//!
//! Bank statements print amounts with decimal commas, grouping spaces and
//! no-break spaces. Amounts are normalized to text with a decimal point, then
//! to a decimal with two fractional digits. Normalization never fails: absent
//! or garbled input becomes zero.

use bigdecimal::{BigDecimal, RoundingMode};
use std::str::FromStr;

/// Fractional digits kept on statement amounts
pub const AMOUNT_SCALE: i64 = 2;

/// Replace decimal commas and drop grouping spaces
pub fn normalize_text(raw: &str) -> String {
    raw.chars()
        .filter_map(|ch| match ch {
            ',' => Some('.'),
            ' ' | '\u{a0}' => None,
            other => Some(other),
        })
        .collect()
}

/// Zero at statement scale
pub fn zero() -> BigDecimal {
    BigDecimal::from(0).with_scale(AMOUNT_SCALE)
}

/// Parse an optional statement amount, half-up rounded to two digits
pub fn normalize(raw: Option<&str>) -> BigDecimal {
    raw.map(normalize_text)
        .and_then(|text| parse(&text))
        .unwrap_or_else(zero)
}

fn parse(text: &str) -> Option<BigDecimal> {
    let text = text.strip_prefix('+').unwrap_or(text);
    if text.is_empty() {
        return None;
    }
    // Plain decimals only
    if text.contains(|c: char| c.eq_ignore_ascii_case(&'e')) {
        tracing::debug!(amount = text, "exponent in statement amount");
        return None;
    }

    match BigDecimal::from_str(text) {
        Ok(value) => Some(value.with_scale_round(AMOUNT_SCALE, RoundingMode::HalfUp)),
        Err(e) => {
            tracing::debug!(amount = text, error = %e, "unparseable statement amount");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("1 234,56"), "1234.56");
        assert_eq!(normalize_text("-7\u{a0}000,5"), "-7000.5");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_rounds_half_up() {
        assert_eq!(normalize(Some("1 234,565")).to_string(), "1234.57");
        assert_eq!(normalize(Some("-10.005")), BigDecimal::from_str("-10.01").unwrap());
        assert_eq!(normalize(Some("10.004")), BigDecimal::from_str("10.00").unwrap());
    }

    #[test]
    fn test_normalize_keeps_sign() {
        assert_eq!(normalize(Some("-100.00")), BigDecimal::from(-100));
        assert_eq!(normalize(Some("+50,00")), BigDecimal::from(50));
    }

    #[test]
    fn test_absent_or_invalid_is_zero() {
        assert_eq!(normalize(None), BigDecimal::from(0));
        assert_eq!(normalize(Some("")), BigDecimal::from(0));
        assert_eq!(normalize(Some("n/a")), BigDecimal::from(0));
        assert_eq!(normalize(Some("-")), BigDecimal::from(0));
    }

    #[test]
    fn test_fixed_scale() {
        let (_, scale) = normalize(Some("5")).as_bigint_and_exponent();
        assert_eq!(scale, AMOUNT_SCALE);
    }

    #[test]
    fn test_exponent_notation_is_zero() {
        assert_eq!(normalize(Some("1e2000000")), zero());
        assert_eq!(normalize(Some("-5E3")), zero());
        assert_eq!(normalize(Some("+12,5")).to_string(), "12.50");
    }
}
