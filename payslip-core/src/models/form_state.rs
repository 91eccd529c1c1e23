use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AssetSlot, DynamicRow, ImageAsset, PayPeriod, RowId, RowList};

pub const DEFAULT_BRAND_COLOR: &str = "#16a34a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    Monthly,
    Biweekly,
    Weekly,
    Hourly,
}

impl PayFrequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Biweekly => "Biweekly",
            Self::Weekly => "Weekly",
            Self::Hourly => "Hourly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "biweekly" => Some(Self::Biweekly),
            "weekly" => Some(Self::Weekly),
            "hourly" => Some(Self::Hourly),
            _ => None,
        }
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bank,
    Cash,
    Cheque,
    Other,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bank => "Bank",
            Self::Cash => "Cash",
            Self::Cheque => "Cheque",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bank" => Some(Self::Bank),
            "cash" => Some(Self::Cash),
            "cheque" => Some(Self::Cheque),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How basic pay is derived. Hours are only meaningful for hourly pay, so
/// they live inside that variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payType", rename_all = "lowercase")]
pub enum PayBasis {
    Hourly {
        #[serde(rename = "hoursWorked", default)]
        hours_worked: String,
    },
    Salary,
}

impl Default for PayBasis {
    fn default() -> Self {
        Self::Salary
    }
}

/// Everything the user has entered for one payslip.
///
/// Money fields hold the raw text from the form; the calculation engine is
/// the only place they are interpreted. Branding images are never part of
/// the serialized draft, they are persisted under their own keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayslipFormState {
    // Company
    pub company_name: String,
    pub company_address: String,
    pub tax_id: String,
    pub company_contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    #[serde(skip)]
    pub logo: Option<ImageAsset>,

    // Employee
    pub employee_name: String,
    pub employee_id: String,
    pub job_title: String,
    pub department: String,
    pub employee_email: String,
    pub employee_address: String,

    // Pay details
    pub period: PayPeriod,
    pub pay_date: String,
    pub frequency: Option<PayFrequency>,
    pub method: Option<PaymentMethod>,
    pub bank_details: String,

    // Earnings
    pub pay_basis: PayBasis,
    pub pay_rate: String,
    pub overtime_hours: String,
    pub overtime_rate: String,
    pub allowances: Vec<DynamicRow>,
    pub bonuses: Vec<DynamicRow>,

    // Deductions
    pub tax: String,
    pub pension: String,
    pub health_insurance: String,
    pub other_deductions: Vec<DynamicRow>,

    // Compliance
    pub country: String,
    pub wage_rule_ref: String,
    pub notes: String,

    #[serde(skip)]
    pub signature: Option<ImageAsset>,
    pub signature_file_name: Option<String>,
}

impl Default for PayslipFormState {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            company_address: String::new(),
            tax_id: String::new(),
            company_contact: String::new(),
            brand_color: None,
            logo: None,
            employee_name: String::new(),
            employee_id: String::new(),
            job_title: String::new(),
            department: String::new(),
            employee_email: String::new(),
            employee_address: String::new(),
            period: PayPeriod::default(),
            pay_date: String::new(),
            frequency: None,
            method: None,
            bank_details: String::new(),
            pay_basis: PayBasis::default(),
            pay_rate: String::new(),
            overtime_hours: String::new(),
            overtime_rate: String::new(),
            allowances: Vec::new(),
            bonuses: Vec::new(),
            tax: String::new(),
            pension: String::new(),
            health_insurance: String::new(),
            other_deductions: Vec::new(),
            country: String::new(),
            wage_rule_ref: String::new(),
            notes: String::new(),
            signature: None,
            signature_file_name: None,
        }
    }
}

impl PayslipFormState {
    pub fn rows(&self, list: RowList) -> &[DynamicRow] {
        match list {
            RowList::Allowances => &self.allowances,
            RowList::Bonuses => &self.bonuses,
            RowList::OtherDeductions => &self.other_deductions,
        }
    }

    pub fn rows_mut(&mut self, list: RowList) -> &mut Vec<DynamicRow> {
        match list {
            RowList::Allowances => &mut self.allowances,
            RowList::Bonuses => &mut self.bonuses,
            RowList::OtherDeductions => &mut self.other_deductions,
        }
    }

    pub fn row_mut(&mut self, list: RowList, id: &RowId) -> Option<&mut DynamicRow> {
        self.rows_mut(list).iter_mut().find(|row| &row.id == id)
    }

    pub fn asset(&self, slot: AssetSlot) -> Option<&ImageAsset> {
        match slot {
            AssetSlot::Logo => self.logo.as_ref(),
            AssetSlot::Signature => self.signature.as_ref(),
        }
    }

    /// Replaces (or clears) a branding image. The signature file name is kept
    /// in step with the signature asset.
    pub fn set_asset(&mut self, slot: AssetSlot, asset: Option<ImageAsset>) {
        match slot {
            AssetSlot::Logo => self.logo = asset,
            AssetSlot::Signature => {
                if let Some(name) = asset.as_ref().and_then(ImageAsset::file_name) {
                    self.signature_file_name = Some(name.to_string());
                } else if asset.is_none() {
                    self.signature_file_name = None;
                }
                self.signature = asset;
            }
        }
    }

    pub fn brand_color_or_default(&self) -> &str {
        self.brand_color
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_BRAND_COLOR)
    }

    /// Hours worked as entered, or empty text for salaried pay.
    pub fn hours_worked(&self) -> &str {
        match &self.pay_basis {
            PayBasis::Hourly { hours_worked } => hours_worked,
            PayBasis::Salary => "",
        }
    }

    pub fn is_hourly(&self) -> bool {
        matches!(self.pay_basis, PayBasis::Hourly { .. })
    }

    /// Both names needed to show anything meaningful in the preview.
    pub fn has_preview_identity(&self) -> bool {
        !self.employee_name.trim().is_empty() && !self.company_name.trim().is_empty()
    }

    /// Checks the minimum data needed to produce a payslip document.
    ///
    /// Returns every problem found rather than stopping at the first one.
    pub fn validate_for_export(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.employee_name.trim().is_empty() {
            errors.push("Employee name is required".to_string());
        }

        match &self.period {
            PayPeriod::Range { start, end } => {
                if start.trim().is_empty() {
                    errors.push("Pay period start date is required".to_string());
                }
                if end.trim().is_empty() {
                    errors.push("Pay period end date is required".to_string());
                }
            }
            PayPeriod::Month { month, year } => {
                if month.trim().is_empty() {
                    errors.push("Pay period month is required".to_string());
                }
                if year.trim().is_empty() {
                    errors.push("Pay period year is required".to_string());
                }
            }
        }

        if self.pay_rate.trim().is_empty() {
            errors.push("Pay rate is required".to_string());
        }

        if let PayBasis::Hourly { hours_worked } = &self.pay_basis {
            if hours_worked.trim().is_empty() {
                errors.push("Hours worked is required for hourly pay".to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Regenerates ids that collide within a list, keeping the first
    /// occurrence. Only hand-edited drafts and form files can contain these.
    pub fn ensure_unique_row_ids(&mut self) {
        for list in [RowList::Allowances, RowList::Bonuses, RowList::OtherDeductions] {
            let mut seen = HashSet::new();
            for row in self.rows_mut(list) {
                if !seen.insert(row.id.clone()) {
                    row.id = RowId::generate();
                    seen.insert(row.id.clone());
                }
            }
        }
    }
}
