//! On-screen payslip preview.
//!
//! [`render_preview`] builds a [`PayslipView`]: a structured, fully formatted
//! description of the payslip that can be printed as plain text or emitted
//! as a standalone HTML fragment.

use std::fmt::{self, Write as _};

use tracing::debug;

use super::RenderOptions;
use crate::assets::decode_data_url;
use crate::format::{format_date, format_generated_on, format_money, pay_period_label, truncate_label};
use crate::models::{
    AssetSlot, CalculationTotals, DynamicRow, ImageAsset, PayslipFormState, RowList,
};

pub const PLACEHOLDER_TITLE: &str = "Preview Unavailable";
pub const PLACEHOLDER_HINT: &str =
    "Please fill in employee and company information to see the preview";

const ADDRESS_BUDGET: usize = 60;
const CONTACT_BUDGET: usize = 40;
const BANK_BUDGET: usize = 80;
const TEXT_WIDTH: usize = 64;

/// What the preview area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewPane {
    Placeholder,
    Ready(Box<PayslipView>),
}

impl PreviewPane {
    /// Decides between the placeholder and a rendered payslip.
    ///
    /// The guard looks at `current` (what the user has typed right now) while
    /// the content comes from `settled`, the debounced copy of the form.
    pub fn build(
        current: &PayslipFormState,
        settled: &PayslipFormState,
        totals: &CalculationTotals,
        options: &RenderOptions,
    ) -> Self {
        if !current.has_preview_identity() {
            return Self::Placeholder;
        }
        Self::Ready(Box::new(render_preview(settled, totals, options)))
    }
}

impl fmt::Display for PreviewPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => writeln!(f, "{PLACEHOLDER_TITLE}\n{PLACEHOLDER_HINT}"),
            Self::Ready(view) => write!(f, "{view}"),
        }
    }
}

/// An image ready to be inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewImage {
    pub data_url: String,
    pub mime_type: String,
    pub byte_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountLine {
    pub label: String,
    pub amount: String,
}

impl AmountLine {
    fn new(
        label: impl Into<String>,
        amount: rust_decimal::Decimal,
    ) -> Self {
        Self {
            label: label.into(),
            amount: format_money(amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledValue {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceView {
    pub country: Option<String>,
    pub wage_rule_ref: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureView {
    pub image: ViewImage,
    pub file_name: Option<String>,
}

/// A fully formatted payslip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayslipView {
    pub brand_color: String,
    pub currency_symbol: String,

    /// When present the logo replaces the company-name heading.
    pub logo: Option<ViewImage>,
    pub company_heading: String,
    pub subtitle: String,

    pub company_details: Vec<String>,
    pub employee_details: Vec<String>,
    pub period_details: Vec<LabeledValue>,

    pub earnings: Vec<AmountLine>,
    pub gross: String,
    pub deductions: Vec<AmountLine>,
    pub total_deductions: String,

    pub net_pay: String,
    pub bank_details: Option<String>,
    pub compliance: Option<ComplianceView>,

    pub generated_on: String,
    pub country: Option<String>,
    pub signature: Option<SignatureView>,
}

/// Builds the preview of a payslip.
pub fn render_preview(
    form: &PayslipFormState,
    totals: &CalculationTotals,
    options: &RenderOptions,
) -> PayslipView {
    let signature = view_image(options.asset(form, AssetSlot::Signature), AssetSlot::Signature)
        .map(|image| SignatureView {
            image,
            file_name: non_empty(form.signature_file_name.as_deref().unwrap_or_default()),
        });

    PayslipView {
        brand_color: options.brand_color(form).to_hex(),
        currency_symbol: options.currency_symbol.clone(),
        logo: view_image(options.asset(form, AssetSlot::Logo), AssetSlot::Logo),
        company_heading: non_empty(&form.company_name).unwrap_or_else(|| "Company Name".to_string()),
        subtitle: match form.frequency {
            Some(frequency) => format!("{frequency} Payslip"),
            None => "Payslip".to_string(),
        },
        company_details: company_details(form),
        employee_details: employee_details(form),
        period_details: period_details(form),
        earnings: earnings(form, totals),
        gross: format_money(totals.gross),
        deductions: deductions(form, totals),
        total_deductions: format_money(totals.total_deductions),
        net_pay: format_money(totals.net),
        bank_details: non_empty(&form.bank_details).map(|b| truncate_label(&b, BANK_BUDGET)),
        compliance: compliance(form),
        generated_on: format_generated_on(options.generated_on),
        country: non_empty(&form.country),
        signature,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn view_image(
    asset: Option<&ImageAsset>,
    slot: AssetSlot,
) -> Option<ViewImage> {
    let asset = asset?;
    match decode_data_url(asset.data_url()) {
        Ok(decoded) => Some(ViewImage {
            data_url: asset.data_url().to_string(),
            mime_type: decoded.mime_type,
            byte_len: decoded.bytes.len(),
        }),
        Err(error) => {
            debug!(%error, %slot, "omitting undecodable image from preview");
            None
        }
    }
}

fn company_details(form: &PayslipFormState) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(non_empty(&form.company_name));
    lines.extend(non_empty(&form.company_address).map(|a| truncate_label(&a, ADDRESS_BUDGET)));
    lines.extend(non_empty(&form.tax_id).map(|t| format!("Tax ID: {t}")));
    lines.extend(
        non_empty(&form.company_contact).map(|c| format!("Contact: {}", truncate_label(&c, CONTACT_BUDGET))),
    );
    lines
}

fn employee_details(form: &PayslipFormState) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(non_empty(&form.employee_name));
    lines.extend(non_empty(&form.employee_id).map(|id| format!("ID: {id}")));
    lines.extend(non_empty(&form.job_title).map(|t| format!("Title: {t}")));
    lines.extend(non_empty(&form.department).map(|d| format!("Department: {d}")));
    lines.extend(non_empty(&form.employee_email).map(|e| format!("Email: {e}")));
    lines.extend(non_empty(&form.employee_address).map(|a| truncate_label(&a, ADDRESS_BUDGET)));
    lines
}

fn period_details(form: &PayslipFormState) -> Vec<LabeledValue> {
    let mut details = vec![LabeledValue {
        label: "Pay Period",
        value: pay_period_label(&form.period).unwrap_or_else(|| "Not specified".to_string()),
    }];
    if let Some(pay_date) = non_empty(&form.pay_date) {
        details.push(LabeledValue {
            label: "Pay Date",
            value: format_date(&pay_date),
        });
    }
    if let Some(frequency) = form.frequency {
        details.push(LabeledValue {
            label: "Frequency",
            value: frequency.to_string(),
        });
    }
    if let Some(method) = form.method {
        details.push(LabeledValue {
            label: "Method",
            value: method.to_string(),
        });
    }
    details
}

fn row_lines(
    rows: &[DynamicRow],
    list: RowList,
) -> impl Iterator<Item = AmountLine> + '_ {
    rows.iter()
        .map(move |row| (row.display_label(list), row.parsed_amount()))
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(label, amount)| AmountLine::new(label, amount))
}

fn earnings(
    form: &PayslipFormState,
    totals: &CalculationTotals,
) -> Vec<AmountLine> {
    let mut lines = vec![AmountLine::new("Basic Pay", totals.basic_earnings)];
    if !totals.overtime_earnings.is_zero() {
        lines.push(AmountLine::new("Overtime", totals.overtime_earnings));
    }
    lines.extend(row_lines(&form.allowances, RowList::Allowances));
    lines.extend(row_lines(&form.bonuses, RowList::Bonuses));
    lines
}

fn deductions(
    form: &PayslipFormState,
    totals: &CalculationTotals,
) -> Vec<AmountLine> {
    let mut lines = Vec::new();
    for (label, amount) in [
        ("Tax", totals.tax_val),
        ("Pension", totals.pension_val),
        ("Health Insurance", totals.health_val),
    ] {
        if !amount.is_zero() {
            lines.push(AmountLine::new(label, amount));
        }
    }
    lines.extend(row_lines(&form.other_deductions, RowList::OtherDeductions));
    lines
}

fn compliance(form: &PayslipFormState) -> Option<ComplianceView> {
    let view = ComplianceView {
        country: non_empty(&form.country),
        wage_rule_ref: non_empty(&form.wage_rule_ref),
        notes: non_empty(&form.notes),
    };
    (view.country.is_some() || view.wage_rule_ref.is_some() || view.notes.is_some()).then_some(view)
}

impl PayslipView {
    /// Every amount in reading order: earnings, gross, deductions, total
    /// deductions, net.
    pub fn amounts(&self) -> Vec<&str> {
        self.earnings
            .iter()
            .map(|l| l.amount.as_str())
            .chain(std::iter::once(self.gross.as_str()))
            .chain(self.deductions.iter().map(|l| l.amount.as_str()))
            .chain([self.total_deductions.as_str(), self.net_pay.as_str()])
            .collect()
    }

    /// A standalone HTML fragment. All user text is escaped; images are
    /// inlined as data-URLs.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_html(&mut html);
        html
    }

    fn write_html(
        &self,
        out: &mut String,
    ) -> fmt::Result {
        let brand = escape(&self.brand_color);
        let money = |amount: &str| escape(&format!("{}{amount}", self.currency_symbol));

        writeln!(
            out,
            r#"<div id="payslip-preview" style="font-family: Arial, sans-serif; max-width: 800px;">"#
        )?;

        writeln!(out, r#"<header style="border-bottom: 2px solid {brand};">"#)?;
        match &self.logo {
            Some(logo) => writeln!(
                out,
                r#"<img src="{}" alt="Company logo" style="max-width: 200px;">"#,
                escape(&logo.data_url)
            )?,
            None => writeln!(
                out,
                r#"<h1 style="color: {brand};">{}</h1>"#,
                escape(&self.company_heading)
            )?,
        }
        writeln!(out, "<p>PAYSLIP</p>\n<p>{}</p>\n</header>", escape(&self.subtitle))?;

        write_html_block(out, "Company Information", &self.company_details)?;
        write_html_block(out, "Employee Information", &self.employee_details)?;

        writeln!(out, r#"<section class="pay-period">"#)?;
        for detail in &self.period_details {
            writeln!(
                out,
                "<div><strong>{}: </strong><span>{}</span></div>",
                detail.label,
                escape(&detail.value)
            )?;
        }
        writeln!(out, "</section>")?;

        writeln!(out, r#"<section class="earnings">"#)?;
        writeln!(out, r#"<h3 style="border-left: 4px solid {brand};">EARNINGS</h3>"#)?;
        for line in &self.earnings {
            write_html_amount(out, &line.label, &money(&line.amount))?;
        }
        write_html_amount(out, "Gross Pay", &money(&self.gross))?;
        writeln!(out, "</section>")?;

        writeln!(out, r#"<section class="deductions">"#)?;
        writeln!(out, r#"<h3 style="border-left: 4px solid #dc2626;">DEDUCTIONS</h3>"#)?;
        for line in &self.deductions {
            write_html_amount(out, &line.label, &money(&line.amount))?;
        }
        write_html_amount(out, "Total Deductions", &money(&self.total_deductions))?;
        writeln!(out, "</section>")?;

        writeln!(
            out,
            r#"<section class="net-pay" style="background-color: {brand}; color: white;">"#
        )?;
        writeln!(out, "<span>NET PAY</span> <span>{}</span>", money(&self.net_pay))?;
        if let Some(bank) = &self.bank_details {
            writeln!(out, "<div><strong>Bank: </strong><span>{}</span></div>", escape(bank))?;
        }
        writeln!(out, "</section>")?;

        if let Some(compliance) = &self.compliance {
            writeln!(out, r#"<section class="compliance">"#)?;
            writeln!(out, "<h3>Compliance &amp; Additional Information</h3>")?;
            if let Some(country) = &compliance.country {
                writeln!(out, "<div><strong>Country: </strong>{}</div>", escape(country))?;
            }
            if let Some(wage_rule_ref) = &compliance.wage_rule_ref {
                writeln!(out, "<div><strong>Wage Rule Ref: </strong>{}</div>", escape(wage_rule_ref))?;
            }
            if let Some(notes) = &compliance.notes {
                writeln!(out, "<div><strong>Notes:</strong><p>{}</p></div>", escape(notes))?;
            }
            writeln!(out, "</section>")?;
        }

        writeln!(out, "<footer>")?;
        writeln!(
            out,
            "<p>Generated on {} by Complyn Payslip Generator</p>",
            escape(&self.generated_on)
        )?;
        if let Some(country) = &self.country {
            writeln!(out, "<p>Country: {}</p>", escape(country))?;
        }
        if let Some(signature) = &self.signature {
            writeln!(out, r#"<div class="signature"><p>Authorized Signature</p>"#)?;
            writeln!(
                out,
                r#"<img src="{}" alt="Employer signature" style="max-height: 60px;">"#,
                escape(&signature.image.data_url)
            )?;
            if let Some(name) = &signature.file_name {
                writeln!(out, "<p>{}</p>", escape(name))?;
            }
            writeln!(out, "</div>")?;
        }
        writeln!(out, "</footer>\n</div>")
    }
}

fn write_html_block(
    out: &mut String,
    heading: &str,
    lines: &[String],
) -> fmt::Result {
    writeln!(out, "<section>\n<h3>{heading}</h3>")?;
    for line in lines {
        writeln!(out, "<p>{}</p>", escape(line))?;
    }
    writeln!(out, "</section>")
}

fn write_html_amount(
    out: &mut String,
    label: &str,
    amount: &str,
) -> fmt::Result {
    writeln!(out, "<div><span>{}:</span> <span>{amount}</span></div>", escape(label))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for PayslipView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(TEXT_WIDTH);
        let money = |amount: &str| format!("{}{amount}", self.currency_symbol);

        match &self.logo {
            Some(logo) => writeln!(f, "[logo: {}, {} bytes]", logo.mime_type, logo.byte_len)?,
            None => writeln!(f, "{}", self.company_heading)?,
        }
        writeln!(f, "PAYSLIP  {}", self.subtitle)?;
        writeln!(f, "{rule}")?;

        writeln!(f, "Company Information")?;
        for line in &self.company_details {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "Employee Information")?;
        for line in &self.employee_details {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "{rule}")?;

        for detail in &self.period_details {
            writeln!(f, "{}: {}", detail.label, detail.value)?;
        }
        writeln!(f, "{rule}")?;

        writeln!(f, "EARNINGS")?;
        for line in &self.earnings {
            write_amount_row(f, &line.label, &money(&line.amount))?;
        }
        write_amount_row(f, "Gross Pay", &money(&self.gross))?;

        writeln!(f, "DEDUCTIONS")?;
        for line in &self.deductions {
            write_amount_row(f, &line.label, &money(&line.amount))?;
        }
        write_amount_row(f, "Total Deductions", &money(&self.total_deductions))?;
        writeln!(f, "{}", "=".repeat(TEXT_WIDTH))?;

        write_amount_row(f, "NET PAY", &money(&self.net_pay))?;
        if let Some(bank) = &self.bank_details {
            writeln!(f, "Bank: {bank}")?;
        }

        if let Some(compliance) = &self.compliance {
            writeln!(f, "{rule}")?;
            writeln!(f, "Compliance & Additional Information")?;
            if let Some(country) = &compliance.country {
                writeln!(f, "  Country: {country}")?;
            }
            if let Some(wage_rule_ref) = &compliance.wage_rule_ref {
                writeln!(f, "  Wage Rule Ref: {wage_rule_ref}")?;
            }
            if let Some(notes) = &compliance.notes {
                writeln!(f, "  Notes:")?;
                for line in notes.lines() {
                    writeln!(f, "    {line}")?;
                }
            }
        }

        writeln!(f, "{rule}")?;
        writeln!(f, "Generated on {} by Complyn Payslip Generator", self.generated_on)?;
        if let Some(country) = &self.country {
            writeln!(f, "Country: {country}")?;
        }
        if let Some(signature) = &self.signature {
            write!(
                f,
                "Authorized Signature [{}, {} bytes]",
                signature.image.mime_type, signature.image.byte_len
            )?;
            match &signature.file_name {
                Some(name) => writeln!(f, " {name}")?,
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}

fn write_amount_row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    amount: &str,
) -> fmt::Result {
    let label_width = TEXT_WIDTH.saturating_sub(amount.chars().count() + 2);
    writeln!(f, "  {label:<label_width$}{amount}")
}
