//! Common decimal helpers shared by the engine and the formatter.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payslip_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_to(value, 2)
}

/// Rounds to `places` fraction digits, midpoint away from zero.
pub fn round_to(
    value: Decimal,
    places: u32,
) -> Decimal {
    value.round_dp_with_strategy(places, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the smaller of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payslip_core::calculations::common::min;
///
/// assert_eq!(min(dec!(100.00), dec!(200.00)), dec!(100.00));
/// assert_eq!(min(dec!(-100.00), dec!(-200.00)), dec!(-200.00));
/// ```
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Sums values with overflow detection.
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(0.125));

        assert_eq!(result, dec!(0.13));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    #[test]
    fn round_to_supports_other_precisions() {
        assert_eq!(round_to(dec!(1.2349), 3), dec!(1.235));
        assert_eq!(round_to(dec!(2.5), 0), dec!(3));
    }

    // =========================================================================
    // min tests
    // =========================================================================

    #[test]
    fn min_returns_smaller_value() {
        assert_eq!(min(dec!(200.00), dec!(100.00)), dec!(100.00));
    }

    #[test]
    fn min_handles_equal_values() {
        assert_eq!(min(dec!(150.00), dec!(150.00)), dec!(150.00));
    }

    // =========================================================================
    // checked_sum tests
    // =========================================================================

    #[test]
    fn checked_sum_adds_values() {
        assert_eq!(checked_sum([dec!(1.5), dec!(2.25), dec!(0)]), Some(dec!(3.75)));
    }

    #[test]
    fn checked_sum_of_nothing_is_zero() {
        assert_eq!(checked_sum(Vec::new()), Some(Decimal::ZERO));
    }

    #[test]
    fn checked_sum_detects_overflow() {
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
    }
}
