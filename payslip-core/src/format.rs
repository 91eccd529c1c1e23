//! Text formatting shared by the preview and the PDF renderer.
//!
//! Both renderers go through [`format_money`] so a payslip shows identical
//! figures on screen and on paper. Formatting always follows en-US
//! conventions, whatever the locale of the host.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::models::PayPeriod;

const COMPACT_UNITS: [(u32, &str); 3] = [(6, "M"), (9, "B"), (12, "T")];

/// Formats an amount for display.
///
/// Amounts of one million or more use compact notation with at most two
/// fraction digits (`1.23M`, `4B`). Smaller amounts get exactly two fraction
/// digits and comma thousands separators.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payslip_core::format::format_money;
///
/// assert_eq!(format_money(dec!(190500)), "190,500.00");
/// assert_eq!(format_money(dec!(1234567)), "1.23M");
/// ```
pub fn format_money(amount: Decimal) -> String {
    if amount.abs() >= compact_divisor(0) {
        format_compact(amount)
    } else {
        format_grouped(amount)
    }
}

fn compact_divisor(unit: usize) -> Decimal {
    Decimal::from(10_i64.pow(COMPACT_UNITS[unit].0))
}

fn format_compact(amount: Decimal) -> String {
    let magnitude = amount.abs();
    let mut unit = COMPACT_UNITS
        .iter()
        .enumerate()
        .rev()
        .find(|(i, _)| magnitude >= compact_divisor(*i))
        .map_or(0, |(i, _)| i);

    let mut scaled = round_half_up(magnitude / compact_divisor(unit));
    // 999,999,999 rounds to 1000M; show it as 1B instead.
    if scaled >= Decimal::ONE_THOUSAND && unit + 1 < COMPACT_UNITS.len() {
        unit += 1;
        scaled = round_half_up(magnitude / compact_divisor(unit));
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    format!("{sign}{}{}", scaled.normalize(), COMPACT_UNITS[unit].1)
}

fn format_grouped(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Formats an ISO date (`2025-01-05`) as `Jan 5, 2025`.
///
/// Empty input gives empty output; anything unparseable is echoed unchanged.
pub fn format_date(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return datetime.date_naive().format("%b %-d, %Y").to_string();
    }

    input.to_string()
}

/// The numeric date printed in the footer, e.g. `3/1/2025`.
pub fn format_generated_on(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Full English month name for `1..=12`.
pub fn month_name(month: u32) -> Option<&'static str> {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Human-readable pay period, or `None` when the period is incomplete or
/// names an invalid month.
pub fn pay_period_label(period: &PayPeriod) -> Option<String> {
    match period {
        PayPeriod::Range { start, end } => {
            if start.trim().is_empty() || end.trim().is_empty() {
                return None;
            }
            Some(format!("{} to {}", format_date(start), format_date(end)))
        }
        PayPeriod::Month { month, year } => {
            let year = year.trim();
            if year.is_empty() {
                return None;
            }
            let name = leading_number(month).and_then(month_name)?;
            Some(format!("{name} {year}"))
        }
    }
}

fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Shortens text to `budget` characters, appending `...` when cut.
///
/// # Examples
///
/// ```
/// use payslip_core::format::truncate_label;
///
/// assert_eq!(truncate_label("Transport allowance", 9), "Transport...");
/// assert_eq!(truncate_label("Meal", 9), "Meal");
/// ```
pub fn truncate_label(
    text: &str,
    budget: usize,
) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(budget).collect();
    cut.push_str("...");
    cut
}
