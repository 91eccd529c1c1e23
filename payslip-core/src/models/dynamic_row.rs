use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::parse_money;

/// Stable identity of a dynamic row. Generated once when the row is created
/// and never reused, so edits and removals address rows by id rather than by
/// their position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-defined allowance, bonus or deduction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicRow {
    #[serde(default = "RowId::generate")]
    pub id: RowId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub amount: String,
}

impl DynamicRow {
    pub fn new(label: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            id: RowId::generate(),
            label: label.into(),
            amount: amount.into(),
        }
    }

    pub fn parsed_amount(&self) -> Decimal {
        parse_money(&self.amount)
    }

    /// The label shown on rendered payslips, falling back to the list's
    /// generic name when the user left it blank.
    pub fn display_label(&self, list: RowList) -> &str {
        if self.label.trim().is_empty() {
            list.default_label()
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowList {
    Allowances,
    Bonuses,
    OtherDeductions,
}

impl RowList {
    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Allowances => "Allowance",
            Self::Bonuses => "Bonus",
            Self::OtherDeductions => "Deduction",
        }
    }
}

impl fmt::Display for RowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowances => f.write_str("allowances"),
            Self::Bonuses => f.write_str("bonuses"),
            Self::OtherDeductions => f.write_str("other deductions"),
        }
    }
}
