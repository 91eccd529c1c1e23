use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived figures for one payslip. Produced fresh by the calculation engine
/// on every change and never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationTotals {
    pub basic_earnings: Decimal,
    pub overtime_earnings: Decimal,
    pub allowances_total: Decimal,
    pub bonuses_total: Decimal,
    pub gross: Decimal,

    pub tax_val: Decimal,
    pub pension_val: Decimal,
    pub health_val: Decimal,
    pub other_deduction_total: Decimal,
    /// Sum of all deductions, capped at `gross`.
    pub total_deductions: Decimal,
    pub net: Decimal,

    // Echoed inputs
    pub pay_rate: Decimal,
    pub hours_worked: Decimal,
}

impl CalculationTotals {
    /// The all-zero snapshot shown when a calculation cannot be completed.
    pub fn zero() -> Self {
        Self::default()
    }
}
