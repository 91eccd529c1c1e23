use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The period a payslip covers: either an explicit date range or a calendar
/// month. Dates and month/year are kept as the text the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PayPeriod {
    Range {
        #[serde(default)]
        start: String,
        #[serde(default)]
        end: String,
    },
    Month {
        #[serde(default)]
        month: String,
        #[serde(default)]
        year: String,
    },
}

impl Default for PayPeriod {
    fn default() -> Self {
        Self::Range {
            start: String::new(),
            end: String::new(),
        }
    }
}

impl PayPeriod {
    /// A month period with no month chosen and the year pre-filled from `today`.
    pub fn default_month(today: NaiveDate) -> Self {
        Self::Month {
            month: String::new(),
            year: today.year().to_string(),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    /// Every field required by the active variant is non-empty.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Range { start, end } => !start.trim().is_empty() && !end.trim().is_empty(),
            Self::Month { month, year } => !month.trim().is_empty() && !year.trim().is_empty(),
        }
    }
}
