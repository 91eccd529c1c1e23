//! The payslip calculation engine.
//!
//! Turns a [`PayslipFormState`] into a [`CalculationTotals`] snapshot:
//!
//! | Step | Formula |
//! |------|---------|
//! | Basic earnings | hourly: rate × hours, salary: rate |
//! | Overtime rate | explicit rate if positive, else rate × 1.5 |
//! | Overtime earnings | overtime hours × overtime rate |
//! | Gross | basic + overtime + allowances + bonuses |
//! | Tax | `%` text: gross × percentage, else the amount |
//! | Total deductions | tax + pension + health + other rows, capped at gross |
//! | Net | gross − total deductions |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payslip_core::calculations::calculate;
//! use payslip_core::models::{DynamicRow, PayslipFormState};
//!
//! let form = PayslipFormState {
//!     pay_rate: "150000".to_string(),
//!     allowances: vec![DynamicRow::new("Transport", "20000")],
//!     tax: "10%".to_string(),
//!     ..Default::default()
//! };
//!
//! let totals = calculate(&form).unwrap();
//!
//! assert_eq!(totals.gross, dec!(170000));
//! assert_eq!(totals.tax_val, dec!(17000));
//! assert_eq!(totals.net, dec!(153000));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{checked_sum, min};
use crate::calculations::money::{is_percentage, parse_money, parse_percentage};
use crate::models::{CalculationTotals, DynamicRow, PayBasis, PayslipFormState};

/// Default overtime premium applied to the base rate.
pub const OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Errors that can occur during a payslip calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    /// An intermediate value no longer fits in a `Decimal`.
    #[error("arithmetic overflow while computing {step}")]
    Overflow { step: &'static str },
}

/// Calculator for payslip totals.
#[derive(Debug, Clone)]
pub struct PayslipCalculator {
    overtime_multiplier: Decimal,
}

impl Default for PayslipCalculator {
    fn default() -> Self {
        Self {
            overtime_multiplier: OVERTIME_MULTIPLIER,
        }
    }
}

impl PayslipCalculator {
    /// Creates a calculator with a custom overtime premium.
    pub fn with_overtime_multiplier(overtime_multiplier: Decimal) -> Self {
        Self {
            overtime_multiplier,
        }
    }

    /// Calculates every total for the given form.
    ///
    /// Every leaf amount is parsed with [`parse_money`], so the result only
    /// contains non-negative values and `net = gross − total_deductions`.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::Overflow`] if an intermediate value exceeds the
    /// range of `Decimal`.
    pub fn calculate(
        &self,
        form: &PayslipFormState,
    ) -> Result<CalculationTotals, CalcError> {
        let pay_rate = parse_money(&form.pay_rate);
        let hours_worked = parse_money(form.hours_worked());

        let basic_earnings = self.basic_earnings(&form.pay_basis, pay_rate, hours_worked)?;

        let overtime_hours = parse_money(&form.overtime_hours);
        let overtime_rate = self.overtime_rate(&form.overtime_rate, pay_rate)?;
        let overtime_earnings = multiply(overtime_hours, overtime_rate, "overtime earnings")?;

        let allowances_total = sum_rows(&form.allowances, "allowances")?;
        let bonuses_total = sum_rows(&form.bonuses, "bonuses")?;

        let gross = checked_sum([basic_earnings, overtime_earnings, allowances_total, bonuses_total])
            .ok_or(CalcError::Overflow { step: "gross pay" })?;

        let tax_val = self.tax_value(&form.tax, gross)?;
        let pension_val = parse_money(&form.pension);
        let health_val = parse_money(&form.health_insurance);
        let other_deduction_total = sum_rows(&form.other_deductions, "other deductions")?;

        let total_deductions =
            self.total_deductions(&[tax_val, pension_val, health_val, other_deduction_total], gross)?;
        let net = gross - total_deductions;

        Ok(CalculationTotals {
            basic_earnings,
            overtime_earnings,
            allowances_total,
            bonuses_total,
            gross,
            tax_val,
            pension_val,
            health_val,
            other_deduction_total,
            total_deductions,
            net,
            pay_rate,
            hours_worked,
        })
    }

    fn basic_earnings(
        &self,
        pay_basis: &PayBasis,
        pay_rate: Decimal,
        hours_worked: Decimal,
    ) -> Result<Decimal, CalcError> {
        match pay_basis {
            PayBasis::Hourly { .. } => multiply(pay_rate, hours_worked, "basic earnings"),
            PayBasis::Salary => Ok(pay_rate),
        }
    }

    /// An explicit overtime rate wins only when it parses to a positive value.
    fn overtime_rate(
        &self,
        explicit: &str,
        pay_rate: Decimal,
    ) -> Result<Decimal, CalcError> {
        let explicit = parse_money(explicit);
        if explicit > Decimal::ZERO {
            Ok(explicit)
        } else {
            multiply(pay_rate, self.overtime_multiplier, "overtime rate")
        }
    }

    fn tax_value(
        &self,
        tax: &str,
        gross: Decimal,
    ) -> Result<Decimal, CalcError> {
        if is_percentage(tax) {
            multiply(gross, parse_percentage(tax), "tax")
        } else {
            Ok(parse_money(tax))
        }
    }

    /// Sums the deductions and caps them at gross so net pay never goes negative.
    fn total_deductions(
        &self,
        deductions: &[Decimal],
        gross: Decimal,
    ) -> Result<Decimal, CalcError> {
        let raw = checked_sum(deductions.iter().copied())
            .ok_or(CalcError::Overflow { step: "total deductions" })?;
        Ok(min(raw, gross))
    }
}

/// Calculates totals with the default overtime premium.
pub fn calculate(form: &PayslipFormState) -> Result<CalculationTotals, CalcError> {
    PayslipCalculator::default().calculate(form)
}

/// Calculates totals, falling back to [`CalculationTotals::zero`] when the
/// calculation fails so callers always have something to display.
pub fn calculate_or_zero(form: &PayslipFormState) -> CalculationTotals {
    calculate(form).unwrap_or_else(|error| {
        warn!(%error, "payslip calculation failed, showing zero totals");
        CalculationTotals::zero()
    })
}

fn multiply(
    a: Decimal,
    b: Decimal,
    step: &'static str,
) -> Result<Decimal, CalcError> {
    a.checked_mul(b).ok_or(CalcError::Overflow { step })
}

fn sum_rows(
    rows: &[DynamicRow],
    step: &'static str,
) -> Result<Decimal, CalcError> {
    checked_sum(rows.iter().map(DynamicRow::parsed_amount)).ok_or(CalcError::Overflow { step })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{DynamicRow, PayPeriod};

    fn salary_form(pay_rate: &str) -> PayslipFormState {
        PayslipFormState {
            employee_name: "Ada Obi".to_string(),
            company_name: "Acme Ltd".to_string(),
            pay_rate: pay_rate.to_string(),
            ..Default::default()
        }
    }

    fn hourly_form(
        pay_rate: &str,
        hours: &str,
    ) -> PayslipFormState {
        PayslipFormState {
            pay_basis: PayBasis::Hourly {
                hours_worked: hours.to_string(),
            },
            ..salary_form(pay_rate)
        }
    }

    // =========================================================================
    // Scenario tests
    // =========================================================================

    #[test]
    fn monthly_salary_with_allowance_bonus_and_percentage_tax() {
        let form = PayslipFormState {
            period: PayPeriod::Month {
                month: "03".to_string(),
                year: "2025".to_string(),
            },
            allowances: vec![DynamicRow::new("Transport", "20000")],
            bonuses: vec![DynamicRow::new("Performance", "50000")],
            tax: "10%".to_string(),
            pension: "7500".to_string(),
            ..salary_form("150000")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.basic_earnings, dec!(150000));
        assert_eq!(totals.gross, dec!(220000));
        assert_eq!(totals.tax_val, dec!(22000));
        assert_eq!(totals.total_deductions, dec!(29500));
        assert_eq!(totals.net, dec!(190500));
    }

    #[test]
    fn hourly_pay_with_default_overtime_rate() {
        let form = PayslipFormState {
            overtime_hours: "10".to_string(),
            ..hourly_form("2000", "160")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.basic_earnings, dec!(320000));
        assert_eq!(totals.overtime_earnings, dec!(30000));
        assert_eq!(totals.gross, dec!(350000));
        assert_eq!(totals.net, dec!(350000));
        assert_eq!(totals.hours_worked, dec!(160));
    }

    #[test]
    fn hourly_pay_with_explicit_overtime_bonus_and_fixed_tax() {
        let form = PayslipFormState {
            overtime_hours: "10".to_string(),
            overtime_rate: "3750".to_string(),
            bonuses: vec![DynamicRow::new("Performance", "25000")],
            tax: "45000".to_string(),
            health_insurance: "15000".to_string(),
            ..hourly_form("2500", "160")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.basic_earnings, dec!(400000));
        assert_eq!(totals.overtime_earnings, dec!(37500));
        assert_eq!(totals.bonuses_total, dec!(25000));
        assert_eq!(totals.gross, dec!(462500));
        assert_eq!(totals.tax_val, dec!(45000));
        assert_eq!(totals.health_val, dec!(15000));
        assert_eq!(totals.total_deductions, dec!(60000));
        assert_eq!(totals.net, dec!(402500));
    }

    #[test]
    fn deductions_are_capped_at_gross() {
        let form = PayslipFormState {
            tax: "5000".to_string(),
            ..salary_form("1000")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.tax_val, dec!(5000));
        assert_eq!(totals.total_deductions, dec!(1000));
        assert_eq!(totals.net, Decimal::ZERO);
    }

    #[test]
    fn malformed_input_yields_zero_totals() {
        let form = PayslipFormState {
            tax: "%%".to_string(),
            ..hourly_form("abc", "")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals, CalculationTotals::zero());
    }

    #[test]
    fn malformed_salary_input_yields_zero_totals() {
        let form = PayslipFormState {
            tax: "%".to_string(),
            ..salary_form("abc")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals, CalculationTotals::zero());
    }

    // =========================================================================
    // Overtime tests
    // =========================================================================

    #[test]
    fn explicit_overtime_rate_is_used() {
        let form = PayslipFormState {
            overtime_hours: "4".to_string(),
            overtime_rate: "2500".to_string(),
            ..hourly_form("1000", "10")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.overtime_earnings, dec!(10000));
    }

    #[test]
    fn zero_overtime_rate_falls_back_to_default() {
        let form = PayslipFormState {
            overtime_hours: "2".to_string(),
            overtime_rate: "0".to_string(),
            ..hourly_form("1000", "10")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.overtime_earnings, dec!(3000));
    }

    #[test]
    fn salaried_overtime_uses_salary_as_base_rate() {
        let form = PayslipFormState {
            overtime_hours: "1".to_string(),
            ..salary_form("100")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.overtime_earnings, dec!(150));
        assert_eq!(totals.gross, dec!(250));
    }

    #[test]
    fn custom_overtime_multiplier() {
        let calculator = PayslipCalculator::with_overtime_multiplier(dec!(2));
        let form = PayslipFormState {
            overtime_hours: "3".to_string(),
            ..hourly_form("100", "1")
        };

        let totals = calculator.calculate(&form).unwrap();

        assert_eq!(totals.overtime_earnings, dec!(600));
    }

    // =========================================================================
    // Tax mode tests
    // =========================================================================

    #[test]
    fn fixed_tax_amount() {
        let form = PayslipFormState {
            tax: "1,200".to_string(),
            ..salary_form("10000")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.tax_val, dec!(1200));
    }

    #[test]
    fn percentage_tax_with_spaces() {
        let form = PayslipFormState {
            tax: " 7.5% ".to_string(),
            ..salary_form("10000")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.tax_val, dec!(750));
    }

    #[test]
    fn percentage_tax_applies_to_gross_including_extras() {
        let form = PayslipFormState {
            bonuses: vec![DynamicRow::new("Bonus", "1000")],
            tax: "50%".to_string(),
            ..salary_form("1000")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.tax_val, dec!(1000));
        assert_eq!(totals.net, dec!(1000));
    }

    // =========================================================================
    // Row and invariant tests
    // =========================================================================

    #[test]
    fn row_amounts_are_parsed_leniently() {
        let form = PayslipFormState {
            allowances: vec![
                DynamicRow::new("Housing", "₦10,000"),
                DynamicRow::new("Broken", "n/a"),
                DynamicRow::new("Negative", "-50"),
            ],
            other_deductions: vec![DynamicRow::new("Loan", "2,500.50")],
            ..salary_form("0")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.allowances_total, dec!(10000));
        assert_eq!(totals.other_deduction_total, dec!(2500.50));
        assert_eq!(totals.net, dec!(7499.50));
    }

    #[test]
    fn salary_ignores_hours() {
        let totals = calculate(&salary_form("5000")).unwrap();

        assert_eq!(totals.basic_earnings, dec!(5000));
        assert_eq!(totals.hours_worked, Decimal::ZERO);
    }

    #[test]
    fn net_equals_gross_minus_deductions() {
        let form = PayslipFormState {
            tax: "12%".to_string(),
            pension: "800".to_string(),
            health_insurance: "150.25".to_string(),
            other_deductions: vec![DynamicRow::new("Union", "40")],
            ..hourly_form("37.5", "42")
        };

        let totals = calculate(&form).unwrap();

        assert_eq!(totals.net, totals.gross - totals.total_deductions);
        assert!(totals.total_deductions <= totals.gross);
    }

    // =========================================================================
    // Overflow tests
    // =========================================================================

    #[test]
    fn overflow_is_reported() {
        let huge = "79228162514264337593543950335";
        let form = hourly_form(huge, huge);

        let result = calculate(&form);

        assert_eq!(
            result,
            Err(CalcError::Overflow {
                step: "basic earnings"
            })
        );
    }

    #[test]
    fn overflow_falls_back_to_zero_totals() {
        let huge = "79228162514264337593543950335";
        let form = hourly_form(huge, huge);

        assert_eq!(calculate_or_zero(&form), CalculationTotals::zero());
    }
}
