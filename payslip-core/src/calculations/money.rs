//! Lenient parsing of money and percentage text.
//!
//! Users type amounts with currency symbols, thousands separators and stray
//! whitespace. Both parsers accept anything and never fail: unusable input
//! becomes zero.

use std::str::FromStr;

use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Parses a money amount, returning a non-negative value.
///
/// Every character other than ASCII digits, `.` and `-` is removed first, then
/// the longest leading number is read. Anything that does not start with a
/// number (including empty text) is zero, and negative results clamp to zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payslip_core::calculations::parse_money;
///
/// assert_eq!(parse_money("₦1,234.50"), dec!(1234.50));
/// assert_eq!(parse_money("abc"), dec!(0));
/// assert_eq!(parse_money("-500"), dec!(0));
/// ```
pub fn parse_money(input: &str) -> Decimal {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    leading_decimal(&cleaned).map_or(Decimal::ZERO, |value| value.max(Decimal::ZERO))
}

/// Parses a percentage such as `"7.5%"` into a fraction (`0.075`).
///
/// The trimmed text must end with `%`, otherwise the result is zero. The
/// number is clamped to `[0, 100]` before dividing by 100.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payslip_core::calculations::parse_percentage;
///
/// assert_eq!(parse_percentage("10%"), dec!(0.10));
/// assert_eq!(parse_percentage("150%"), dec!(1));
/// assert_eq!(parse_percentage("10"), dec!(0));
/// ```
pub fn parse_percentage(input: &str) -> Decimal {
    let Some(number) = input.trim().strip_suffix('%') else {
        return Decimal::ZERO;
    };

    leading_decimal(number.trim_start()).map_or(Decimal::ZERO, |value| {
        value.clamp(Decimal::ZERO, HUNDRED) / HUNDRED
    })
}

/// True when the text is written as a percentage.
pub fn is_percentage(input: &str) -> bool {
    input.trim().ends_with('%')
}

/// Reads the longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`.
///
/// Returns `None` when there is no digit before the exponent. Values too
/// large for a `Decimal` saturate at `Decimal::MAX`/`Decimal::MIN`.
fn leading_decimal(text: &str) -> Option<Decimal> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &text[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &text[frac_start..frac_end];
        pos = frac_end;
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut literal = String::with_capacity(int_digits.len() + frac_digits.len() + 3);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }

    let saturated = if negative { Decimal::MIN } else { Decimal::MAX };
    let mantissa = match Decimal::from_str(&literal) {
        Ok(value) => value,
        Err(_) => return Some(saturated),
    };

    match exponent(&bytes[pos..]) {
        Some(exp) => Some(scale_by_power_of_ten(mantissa, exp).unwrap_or(saturated)),
        None => Some(mantissa),
    }
}

/// Parses `e[+-]digits` at the start of `bytes`, if present.
fn exponent(bytes: &[u8]) -> Option<i32> {
    let (first, rest) = bytes.split_first()?;
    if !matches!(first, b'e' | b'E') {
        return None;
    }

    let (negative, digits) = match rest.split_first() {
        Some((b'-', digits)) => (true, digits),
        Some((b'+', digits)) => (false, digits),
        _ => (false, rest),
    };

    let len = digits.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }

    let magnitude = digits[..len].iter().fold(0_i32, |acc, b| {
        acc.saturating_mul(10).saturating_add(i32::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// `value × 10^exp`, or `None` when the result does not fit.
fn scale_by_power_of_ten(
    value: Decimal,
    exp: i32,
) -> Option<Decimal> {
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }

    let ten = Decimal::TEN;
    let mut result = value;
    if exp >= 0 {
        for _ in 0..exp {
            result = result.checked_mul(ten)?;
        }
    } else {
        // Past 28 places everything has underflowed to zero.
        for _ in 0..exp.unsigned_abs().min(29) {
            result = result.checked_div(ten)?;
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // parse_money tests
    // =========================================================================

    #[test]
    fn parse_money_reads_plain_numbers() {
        assert_eq!(parse_money("150000"), dec!(150000));
        assert_eq!(parse_money("12.5"), dec!(12.5));
    }

    #[test]
    fn parse_money_treats_empty_as_zero() {
        assert_eq!(parse_money(""), Decimal::ZERO);
        assert_eq!(parse_money("   "), Decimal::ZERO);
    }

    #[test]
    fn parse_money_reads_literal_zero() {
        assert_eq!(parse_money("0"), Decimal::ZERO);
    }

    #[test]
    fn parse_money_strips_symbols_and_separators() {
        assert_eq!(parse_money("₦ 1,234,567.89"), dec!(1234567.89));
        assert_eq!(parse_money("$20 000"), dec!(20000));
    }

    #[test]
    fn parse_money_garbage_is_zero() {
        assert_eq!(parse_money("abc"), Decimal::ZERO);
        assert_eq!(parse_money("-"), Decimal::ZERO);
        assert_eq!(parse_money("."), Decimal::ZERO);
    }

    #[test]
    fn parse_money_clamps_negatives() {
        assert_eq!(parse_money("-500"), Decimal::ZERO);
        assert_eq!(parse_money("-0"), Decimal::ZERO);
    }

    #[test]
    fn parse_money_reads_leading_number_only() {
        assert_eq!(parse_money("1.2.3"), dec!(1.2));
        assert_eq!(parse_money("5-3"), dec!(5));
        assert_eq!(parse_money("12abc34"), dec!(1234));
    }

    #[test]
    fn parse_money_accepts_missing_integer_part() {
        assert_eq!(parse_money(".75"), dec!(0.75));
        assert_eq!(parse_money("5."), dec!(5));
    }

    #[test]
    fn parse_money_saturates_on_overflow() {
        assert_eq!(parse_money("99999999999999999999999999999999"), Decimal::MAX);
    }

    #[test]
    fn parse_money_drops_exponent_marker() {
        assert_eq!(parse_money("1e3"), dec!(13));
    }

    #[test]
    fn parse_money_ignores_percent_sign() {
        assert_eq!(parse_money("10%"), dec!(10));
    }

    // =========================================================================
    // parse_percentage tests
    // =========================================================================

    #[test]
    fn parse_percentage_converts_to_fraction() {
        assert_eq!(parse_percentage("10%"), dec!(0.1));
        assert_eq!(parse_percentage("7.5%"), dec!(0.075));
    }

    #[test]
    fn parse_percentage_allows_surrounding_whitespace() {
        assert_eq!(parse_percentage("  12.5 % "), dec!(0.125));
    }

    #[test]
    fn parse_percentage_requires_suffix() {
        assert_eq!(parse_percentage("10"), Decimal::ZERO);
        assert_eq!(parse_percentage("%10"), Decimal::ZERO);
    }

    #[test]
    fn parse_percentage_clamps_range() {
        assert_eq!(parse_percentage("150%"), Decimal::ONE);
        assert_eq!(parse_percentage("-5%"), Decimal::ZERO);
    }

    #[test]
    fn parse_percentage_reads_exponent() {
        assert_eq!(parse_percentage("1e2%"), Decimal::ONE);
        assert_eq!(parse_percentage("2.5E1%"), dec!(0.25));
        assert_eq!(parse_percentage("5e-1%"), dec!(0.005));
        assert_eq!(parse_percentage("1e400%"), Decimal::ONE);
    }

    #[test]
    fn parse_percentage_ignores_bare_exponent_marker() {
        assert_eq!(parse_percentage("12e%"), dec!(0.12));
        assert_eq!(parse_percentage("3e+%"), dec!(0.03));
    }

    #[test]
    fn parse_percentage_garbage_is_zero() {
        assert_eq!(parse_percentage("%"), Decimal::ZERO);
        assert_eq!(parse_percentage("abc%"), Decimal::ZERO);
    }

    #[test]
    fn is_percentage_checks_trimmed_suffix() {
        assert!(is_percentage("10% "));
        assert!(!is_percentage("10"));
        assert!(!is_percentage(""));
    }
}
