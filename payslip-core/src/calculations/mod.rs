//! Payslip arithmetic: lenient parsing of user-entered amounts and the
//! calculation engine that turns a form into [`CalculationTotals`].
//!
//! [`CalculationTotals`]: crate::models::CalculationTotals

pub mod common;
pub mod engine;
pub mod money;

pub use engine::{CalcError, OVERTIME_MULTIPLIER, PayslipCalculator, calculate, calculate_or_zero};
pub use money::{is_percentage, parse_money, parse_percentage};
