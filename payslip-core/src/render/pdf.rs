//! Fixed A4 payslip layout.
//!
//! The page is drawn as a sequence of sections. Each section receives the
//! vertical cursor (millimetres from the top) where it may start and returns
//! the cursor for the next one:
//!
//! | Section | Draws |
//! |---------|-------|
//! | header | logo, company name, `PAYSLIP`, frequency, brand rule |
//! | parties | company and employee information columns |
//! | pay period | shaded box with period, pay date, frequency, method |
//! | earnings & deductions | two tables with totals |
//! | net pay | brand-coloured band, bank details |
//! | compliance | optional box with country, wage rule and notes |
//! | footer | generated-on line, country, signature |
//!
//! Content that overflows the page is not paginated.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::RenderOptions;
use super::backend::{DocumentBackend, DocumentError, Point, Rect, TextAlign, TextStyle};
use super::color::Rgb;
use crate::assets::decode_data_url;
use crate::format::{format_date, format_generated_on, format_money, pay_period_label, truncate_label};
use crate::models::{AssetSlot, CalculationTotals, DynamicRow, PayslipFormState, RowList};

const LEFT_MARGIN: f32 = 15.0;
const CONTENT_WIDTH: f32 = 180.0;
const TEXT_LEFT: f32 = 20.0;
const HEADER_RIGHT: f32 = 190.0;
const RIGHT_COLUMN: f32 = 120.0;
const RIGHT_VALUE_COLUMN: f32 = 150.0;
const VALUE_COLUMN: f32 = 50.0;
const PAGE_CENTER: f32 = 105.0;
const PAGE_RIGHT: f32 = 195.0;

const ADDRESS_WRAP: f32 = 70.0;
const NOTES_WRAP: f32 = 170.0;
const WRAPPED_LINE_PITCH: f32 = 5.0;
const LINE_PITCH: f32 = 6.0;
const ROW_LABEL_BUDGET: usize = 18;

const EARNINGS_AMOUNT_RIGHT: f32 = 95.0;
const DEDUCTIONS_LEFT: f32 = 110.0;
const DEDUCTIONS_TEXT: f32 = 115.0;
const DEDUCTIONS_AMOUNT_RIGHT: f32 = 180.0;
const TABLE_WIDTH: f32 = 85.0;

const LOGO_FRAME: (f32, f32) = (26.0, 12.0);
const SIGNATURE_FRAME: (f32, f32) = (35.0, 10.0);
const SIGNATURE_LEFT: f32 = 150.0;
const SIGNATURE_CENTER: f32 = 167.0;

/// Lays a payslip out on a [`DocumentBackend`].
pub struct PdfRenderer<'a, B: DocumentBackend> {
    backend: &'a mut B,
    form: &'a PayslipFormState,
    totals: &'a CalculationTotals,
    options: &'a RenderOptions,
    brand: Rgb,
}

impl<'a, B: DocumentBackend> PdfRenderer<'a, B> {
    pub fn new(
        backend: &'a mut B,
        form: &'a PayslipFormState,
        totals: &'a CalculationTotals,
        options: &'a RenderOptions,
    ) -> Self {
        let brand = options.brand_color(form);
        Self {
            backend,
            form,
            totals,
            options,
            brand,
        }
    }

    /// Draws every section in order.
    ///
    /// # Errors
    ///
    /// Any backend failure other than embedding a branding image aborts the
    /// layout. Image failures are logged and the section continues without
    /// the image.
    pub fn render(mut self) -> Result<(), DocumentError> {
        let header_end = self.header()?;
        let parties_end = self.parties(header_end)?;
        let period_end = self.pay_period(parties_end)?;
        let tables_end = self.earnings_and_deductions(period_end)?;
        let net_end = self.net_pay(tables_end)?;
        let compliance_end = self.compliance(net_end)?;
        self.footer(compliance_end)
    }

    fn text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: TextStyle,
    ) -> Result<(), DocumentError> {
        self.backend.add_text(text, Point::new(x, y), &style, TextAlign::Left)
    }

    fn text_aligned(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: TextStyle,
        align: TextAlign,
    ) -> Result<(), DocumentError> {
        self.backend.add_text(text, Point::new(x, y), &style, align)
    }

    /// Draws wrapped text with a 5 mm pitch and returns the height used.
    fn wrapped(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        max_width: f32,
        style: TextStyle,
    ) -> Result<f32, DocumentError> {
        let lines = self.backend.wrap_text(text, max_width, &style);
        for (i, line) in lines.iter().enumerate() {
            self.text(line, x, y + i as f32 * WRAPPED_LINE_PITCH, style)?;
        }
        Ok(lines.len() as f32 * WRAPPED_LINE_PITCH)
    }

    fn outlined_panel(
        &mut self,
        rect: Rect,
    ) -> Result<(), DocumentError> {
        self.backend.fill_rect(rect, Rgb::PANEL)?;
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.x + rect.width, rect.y + rect.height);
        let border = Rgb::PANEL_BORDER;
        self.backend.draw_line(Point::new(left, top), Point::new(right, top), border)?;
        self.backend.draw_line(Point::new(right, top), Point::new(right, bottom), border)?;
        self.backend.draw_line(Point::new(right, bottom), Point::new(left, bottom), border)?;
        self.backend.draw_line(Point::new(left, bottom), Point::new(left, top), border)
    }

    /// Decodes and draws a branding image. Returns whether it was drawn.
    fn branding_image(
        &mut self,
        slot: AssetSlot,
        frame: Rect,
    ) -> bool {
        let Some(asset) = self.options.asset(self.form, slot) else {
            return false;
        };

        let image = match decode_data_url(asset.data_url()) {
            Ok(image) => image,
            Err(error) => {
                warn!(%error, %slot, "skipping undecodable image in payslip document");
                return false;
            }
        };

        match self.backend.add_image(&image, frame) {
            Ok(()) => {
                debug!(%slot, bytes = image.bytes.len(), "embedded image in payslip document");
                true
            }
            Err(error) => {
                warn!(%error, %slot, "failed to embed image in payslip document");
                false
            }
        }
    }

    fn header(&mut self) -> Result<f32, DocumentError> {
        let form = self.form;
        let mut y = 8.0;

        if self.options.asset(form, AssetSlot::Logo).is_some() {
            let frame = Rect::new(TEXT_LEFT, y, LOGO_FRAME.0, LOGO_FRAME.1);
            y += if self.branding_image(AssetSlot::Logo, frame) { 16.0 } else { 8.0 };
        }

        let company = or_placeholder(&form.company_name, "Company Name");
        self.text(company, TEXT_LEFT, y + 5.0, TextStyle::bold(13.0, self.brand))?;
        self.text_aligned(
            "PAYSLIP",
            HEADER_RIGHT,
            y,
            TextStyle::bold(15.0, Rgb::INK),
            TextAlign::Right,
        )?;
        if let Some(frequency) = form.frequency {
            self.text_aligned(
                &format!("{frequency} Payslip"),
                HEADER_RIGHT,
                y + 5.0,
                TextStyle::bold(11.0, Rgb::MUTED),
                TextAlign::Right,
            )?;
        }

        self.backend
            .fill_rect(Rect::new(LEFT_MARGIN, y + 8.0, CONTENT_WIDTH, 1.5), self.brand)?;
        Ok(y + 16.0)
    }

    fn parties(
        &mut self,
        start: f32,
    ) -> Result<f32, DocumentError> {
        let heading = TextStyle::bold(13.0, Rgb::INK);
        let body = TextStyle::normal(11.0, Rgb::BODY);
        let form = self.form;

        let mut y = start;
        self.text("COMPANY INFORMATION", TEXT_LEFT, y, heading)?;
        y += 7.0;
        if !form.company_address.trim().is_empty() {
            y += self.wrapped(&form.company_address, TEXT_LEFT, y, ADDRESS_WRAP, body)?;
        }
        for line in [
            labelled("Tax ID", &form.tax_id),
            labelled("Contact", &form.company_contact),
        ]
        .into_iter()
        .flatten()
        {
            self.text(&line, TEXT_LEFT, y, body)?;
            y += LINE_PITCH;
        }

        let mut y_employee = start;
        self.text("EMPLOYEE INFORMATION", RIGHT_COLUMN, y_employee, heading)?;
        y_employee += 7.0;
        let name = or_placeholder(&form.employee_name, "Employee Name");
        self.text(name, RIGHT_COLUMN, y_employee, body)?;
        y_employee += LINE_PITCH;
        for line in [
            labelled("ID", &form.employee_id),
            labelled("Title", &form.job_title),
            labelled("Department", &form.department),
            labelled("Email", &form.employee_email),
        ]
        .into_iter()
        .flatten()
        {
            self.text(&line, RIGHT_COLUMN, y_employee, body)?;
            y_employee += LINE_PITCH;
        }
        if !form.employee_address.trim().is_empty() {
            y_employee +=
                self.wrapped(&form.employee_address, RIGHT_COLUMN, y_employee, ADDRESS_WRAP, body)?;
        }

        Ok(y.max(y_employee) + 10.0)
    }

    fn pay_period(
        &mut self,
        start: f32,
    ) -> Result<f32, DocumentError> {
        let label = TextStyle::bold(11.0, Rgb::INK);
        let value = TextStyle::normal(11.0, Rgb::INK);
        let form = self.form;
        let y = start;

        self.outlined_panel(Rect::new(LEFT_MARGIN, y, CONTENT_WIDTH, 20.0))?;

        let period = pay_period_label(&form.period).unwrap_or_default();
        self.text("Pay Period:", TEXT_LEFT, y + 7.0, label)?;
        self.text(&period, VALUE_COLUMN, y + 7.0, value)?;

        if !form.pay_date.trim().is_empty() {
            self.text("Pay Date:", TEXT_LEFT, y + 13.0, label)?;
            self.text(&format_date(&form.pay_date), VALUE_COLUMN, y + 13.0, value)?;
        }

        let mut y_right = y + 7.0;
        if let Some(frequency) = form.frequency {
            self.text("Frequency:", RIGHT_COLUMN, y_right, label)?;
            self.text(frequency.label(), RIGHT_VALUE_COLUMN, y_right, value)?;
            y_right += LINE_PITCH;
        }
        if let Some(method) = form.method {
            self.text("Method:", RIGHT_COLUMN, y_right, label)?;
            self.text(method.label(), RIGHT_VALUE_COLUMN, y_right, value)?;
        }

        Ok(y + 26.0)
    }

    fn table_heading(
        &mut self,
        title: &str,
        x: f32,
        y: f32,
        accent: Rgb,
    ) -> Result<(), DocumentError> {
        self.backend
            .fill_rect(Rect::new(x, y, TABLE_WIDTH, 9.0), Rgb::PANEL)?;
        self.backend.fill_rect(Rect::new(x, y, 4.0, 9.0), accent)?;
        self.text(title, x + 10.0, y + 6.0, TextStyle::bold(11.0, Rgb::INK))
    }

    fn amount_row(
        &mut self,
        label: &str,
        amount: Decimal,
        x: f32,
        amount_right: f32,
        y: f32,
        amount_color: Rgb,
    ) -> Result<(), DocumentError> {
        let body = TextStyle::normal(11.0, Rgb::BODY);
        self.text(&truncate_label(label, ROW_LABEL_BUDGET), x, y, body)?;
        self.text_aligned(
            &format_money(amount),
            amount_right,
            y,
            TextStyle::normal(11.0, amount_color),
            TextAlign::Right,
        )
    }

    fn earnings_and_deductions(
        &mut self,
        start: f32,
    ) -> Result<f32, DocumentError> {
        let form = self.form;
        let totals = self.totals;

        // Earnings column
        let mut y = start;
        self.table_heading("EARNINGS", LEFT_MARGIN, y, self.brand)?;
        y += 16.0;

        let mut earnings = vec![("Basic Pay", totals.basic_earnings)];
        if totals.overtime_earnings > Decimal::ZERO {
            earnings.push(("Overtime", totals.overtime_earnings));
        }
        earnings.extend(positive_rows(&form.allowances, RowList::Allowances));
        earnings.extend(positive_rows(&form.bonuses, RowList::Bonuses));

        for (label, amount) in earnings {
            self.amount_row(label, amount, TEXT_LEFT, EARNINGS_AMOUNT_RIGHT, y, Rgb::BODY)?;
            y += LINE_PITCH;
        }

        y += 3.0;
        self.backend
            .draw_line(Point::new(LEFT_MARGIN, y), Point::new(100.0, y), Rgb::RULE)?;
        y += LINE_PITCH;
        let gross_style = TextStyle::bold(11.0, self.brand);
        self.text("Gross Pay", TEXT_LEFT, y, gross_style)?;
        self.text_aligned(
            &format_money(totals.gross),
            EARNINGS_AMOUNT_RIGHT,
            y,
            gross_style,
            TextAlign::Right,
        )?;

        // Deductions column
        let mut y_deductions = start;
        self.table_heading("DEDUCTIONS", DEDUCTIONS_LEFT, y_deductions, Rgb::DEDUCTION_RED)?;
        y_deductions += 16.0;

        let mut deductions: Vec<(&str, Decimal)> = [
            ("Tax", totals.tax_val),
            ("Pension", totals.pension_val),
            ("Health Insurance", totals.health_val),
        ]
        .into_iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .collect();
        deductions.extend(positive_rows(&form.other_deductions, RowList::OtherDeductions));

        for (label, amount) in deductions {
            self.amount_row(
                label,
                amount,
                DEDUCTIONS_TEXT,
                DEDUCTIONS_AMOUNT_RIGHT,
                y_deductions,
                Rgb::DEDUCTION_RED,
            )?;
            y_deductions += LINE_PITCH;
        }

        y_deductions += 3.0;
        self.backend.draw_line(
            Point::new(DEDUCTIONS_LEFT, y_deductions),
            Point::new(PAGE_RIGHT, y_deductions),
            Rgb::RULE,
        )?;
        y_deductions += LINE_PITCH;
        let total_style = TextStyle::bold(11.0, Rgb::DEDUCTION_RED);
        self.text("Total Deductions", DEDUCTIONS_TEXT, y_deductions, total_style)?;
        self.text_aligned(
            &format_money(totals.total_deductions),
            DEDUCTIONS_AMOUNT_RIGHT,
            y_deductions,
            total_style,
            TextAlign::Right,
        )?;

        Ok(y.max(y_deductions) + 10.0)
    }

    fn net_pay(
        &mut self,
        start: f32,
    ) -> Result<f32, DocumentError> {
        let mut y = start;
        self.backend
            .fill_rect(Rect::new(LEFT_MARGIN, y, CONTENT_WIDTH, 13.0), self.brand)?;

        let band = TextStyle::bold(13.0, Rgb::WHITE);
        self.text("NET PAY", TEXT_LEFT, y + 8.0, band)?;
        self.text_aligned(
            &format_money(self.totals.net),
            DEDUCTIONS_AMOUNT_RIGHT,
            y + 8.0,
            band,
            TextAlign::Right,
        )?;
        y += 19.0;

        if !self.form.bank_details.trim().is_empty() {
            let bank = format!("Bank: {}", self.form.bank_details.trim());
            self.text_aligned(
                &bank,
                PAGE_CENTER,
                y,
                TextStyle::normal(11.0, Rgb::MUTED),
                TextAlign::Center,
            )?;
            y += LINE_PITCH;
        }

        Ok(y + 5.0)
    }

    fn compliance(
        &mut self,
        start: f32,
    ) -> Result<f32, DocumentError> {
        let form = self.form;
        let country = labelled("Country", &form.country);
        let wage_rule = labelled("Wage Rule Ref", &form.wage_rule_ref);
        let notes = form.notes.trim();
        if country.is_none() && wage_rule.is_none() && notes.is_empty() {
            return Ok(start);
        }

        let mut y = start;
        self.outlined_panel(Rect::new(LEFT_MARGIN, y, CONTENT_WIDTH, 11.0))?;
        self.text(
            "COMPLIANCE & ADDITIONAL INFORMATION",
            TEXT_LEFT,
            y + 7.0,
            TextStyle::bold(11.0, Rgb::INK),
        )?;
        y += 18.0;

        let body = TextStyle::normal(11.0, Rgb::BODY);
        for line in [country, wage_rule].into_iter().flatten() {
            self.text(&line, TEXT_LEFT, y, body)?;
            y += 7.0;
        }

        if !notes.is_empty() {
            self.text("Notes:", TEXT_LEFT, y, TextStyle::bold(11.0, Rgb::BODY))?;
            y += WRAPPED_LINE_PITCH;
            y += self.wrapped(notes, TEXT_LEFT, y, NOTES_WRAP, body)?;
        }

        Ok(y)
    }

    fn footer(
        &mut self,
        final_y: f32,
    ) -> Result<(), DocumentError> {
        let footer_y = final_y + 8.0;
        self.backend.draw_line(
            Point::new(LEFT_MARGIN, footer_y),
            Point::new(PAGE_RIGHT, footer_y),
            Rgb::RULE,
        )?;

        let small = TextStyle::normal(9.0, Rgb::FAINT);
        let generated = format!(
            "Generated on {} by Complyn Payslip Generator",
            format_generated_on(self.options.generated_on)
        );
        self.text(&generated, TEXT_LEFT, footer_y + 5.0, small)?;
        if let Some(country) = labelled("Country", &self.form.country) {
            self.text(&country, TEXT_LEFT, footer_y + 10.0, small)?;
        }

        if self.options.asset(self.form, AssetSlot::Signature).is_some() {
            let frame = Rect::new(
                SIGNATURE_LEFT,
                footer_y - 20.0,
                SIGNATURE_FRAME.0,
                SIGNATURE_FRAME.1,
            );
            let caption_y = if self.branding_image(AssetSlot::Signature, frame) {
                footer_y - 6.0
            } else {
                footer_y + 5.0
            };
            self.text_aligned(
                "Authorized Signature",
                SIGNATURE_CENTER,
                caption_y,
                TextStyle::bold(9.0, Rgb::INK),
                TextAlign::Center,
            )?;
        }

        Ok(())
    }
}

fn or_placeholder<'a>(
    value: &'a str,
    placeholder: &'a str,
) -> &'a str {
    if value.trim().is_empty() { placeholder } else { value }
}

fn labelled(
    label: &str,
    value: &str,
) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| format!("{label}: {value}"))
}

fn positive_rows(
    rows: &[DynamicRow],
    list: RowList,
) -> impl Iterator<Item = (&str, Decimal)> {
    rows.iter()
        .map(move |row| (row.display_label(list), row.parsed_amount()))
        .filter(|(_, amount)| *amount > Decimal::ZERO)
}

/// Renders a payslip onto `backend` and finishes the document.
pub fn render_document<B: DocumentBackend>(
    mut backend: B,
    form: &PayslipFormState,
    totals: &CalculationTotals,
    options: &RenderOptions,
) -> Result<B::Output, DocumentError> {
    PdfRenderer::new(&mut backend, form, totals, options).render()?;
    backend.finish()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::calculate;
    use crate::models::{ImageAsset, PayFrequency, PayPeriod, PaymentMethod};
    use crate::render::backend::{DrawOp, RecordingBackend};
    use crate::render::preview::render_preview;

    const PNG_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn options(entitled: bool) -> RenderOptions {
        RenderOptions::new(entitled, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())
    }

    fn sample_form() -> PayslipFormState {
        PayslipFormState {
            company_name: "Acme Ltd".to_string(),
            company_address: "12 Marina Road, Victoria Island, Lagos, Nigeria, West Africa".to_string(),
            employee_name: "Ada Obi".to_string(),
            employee_id: "EMP-7".to_string(),
            period: PayPeriod::Month {
                month: "03".to_string(),
                year: "2025".to_string(),
            },
            pay_date: "2025-03-31".to_string(),
            frequency: Some(PayFrequency::Monthly),
            method: Some(PaymentMethod::Bank),
            pay_rate: "150000".to_string(),
            allowances: vec![DynamicRow::new("Transport and logistics allowance", "20000")],
            bonuses: vec![DynamicRow::new("Performance", "50000")],
            other_deductions: vec![DynamicRow::new("Loan", "0")],
            tax: "10%".to_string(),
            pension: "7500".to_string(),
            bank_details: "GTBank 0123456789".to_string(),
            country: "NG".to_string(),
            ..Default::default()
        }
    }

    fn render(
        form: &PayslipFormState,
        backend: RecordingBackend,
        entitled: bool,
    ) -> Result<Vec<DrawOp>, DocumentError> {
        let totals = calculate(form).unwrap();
        render_document(backend, form, &totals, &options(entitled))
    }

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn text_op<'a>(
        ops: &'a [DrawOp],
        wanted: &str,
    ) -> Option<&'a DrawOp> {
        ops.iter()
            .find(|op| matches!(op, DrawOp::Text { text, .. } if text == wanted))
    }

    fn is_amount(text: &str) -> bool {
        text.chars().next().is_some_and(|c| c.is_ascii_digit())
            && (text.ends_with('M') || text.ends_with('B') || text.ends_with('T') || text.contains('.'))
            && text.chars().all(|c| c.is_ascii_digit() || ",.MBT-".contains(c))
    }

    // ===== section content tests =====

    #[test]
    fn draws_all_sections_in_order() {
        let ops = render(&sample_form(), RecordingBackend::new(), false).unwrap();
        let texts = texts(&ops);

        let position = |needle: &str| texts.iter().position(|t| *t == needle).unwrap();
        assert!(position("PAYSLIP") < position("COMPANY INFORMATION"));
        assert!(position("COMPANY INFORMATION") < position("Pay Period:"));
        assert!(position("Pay Period:") < position("EARNINGS"));
        assert!(position("EARNINGS") < position("NET PAY"));
        assert!(position("NET PAY") < position("Generated on 3/31/2025 by Complyn Payslip Generator"));
    }

    #[test]
    fn period_and_dates_are_formatted() {
        let ops = render(&sample_form(), RecordingBackend::new(), false).unwrap();
        let texts = texts(&ops);

        assert!(texts.contains(&"March 2025"));
        assert!(texts.contains(&"Mar 31, 2025"));
        assert!(texts.contains(&"Monthly Payslip"));
        assert!(texts.contains(&"Bank: GTBank 0123456789"));
    }

    #[test]
    fn row_labels_are_truncated_and_zero_rows_skipped() {
        let ops = render(&sample_form(), RecordingBackend::new(), false).unwrap();
        let texts = texts(&ops);

        assert!(texts.contains(&"Transport and logi..."));
        assert!(!texts.contains(&"Loan"));
    }

    #[test]
    fn long_address_wraps_at_five_mm_pitch() {
        let ops = render(&sample_form(), RecordingBackend::new(), false).unwrap();

        let address_rows: Vec<f32> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { at, style, .. } if at.x == TEXT_LEFT && style.size == 11.0 => Some(at.y),
                _ => None,
            })
            .take(2)
            .collect();

        assert_eq!(address_rows.len(), 2);
        assert!((address_rows[1] - address_rows[0] - WRAPPED_LINE_PITCH).abs() < 1e-4);
    }

    #[test]
    fn amounts_are_right_aligned() {
        let form = sample_form();
        let net = format_money(calculate(&form).unwrap().net);
        assert_eq!(net, "190,500.00");

        let ops = render(&form, RecordingBackend::new(), false).unwrap();

        match text_op(&ops, &net) {
            Some(DrawOp::Text { at, align, .. }) => {
                assert_eq!(*align, TextAlign::Right);
                assert_eq!(at.x, DEDUCTIONS_AMOUNT_RIGHT);
            }
            other => panic!("net pay not drawn: {other:?}"),
        }
    }

    #[test]
    fn placeholders_for_missing_names() {
        let form = PayslipFormState {
            company_name: String::new(),
            employee_name: String::new(),
            ..sample_form()
        };

        let ops = render(&form, RecordingBackend::new(), false).unwrap();
        let texts = texts(&ops);

        assert!(texts.contains(&"Company Name"));
        assert!(texts.contains(&"Employee Name"));
    }

    #[test]
    fn compliance_section_only_with_content() {
        let without = PayslipFormState {
            country: String::new(),
            ..sample_form()
        };
        let with_notes = PayslipFormState {
            notes: "Paid per contract.".to_string(),
            ..without.clone()
        };

        let plain = render(&without, RecordingBackend::new(), false).unwrap();
        let annotated = render(&with_notes, RecordingBackend::new(), false).unwrap();

        assert!(!texts(&plain).contains(&"COMPLIANCE & ADDITIONAL INFORMATION"));
        assert!(texts(&annotated).contains(&"COMPLIANCE & ADDITIONAL INFORMATION"));
        assert!(texts(&annotated).contains(&"Paid per contract."));
    }

    // ===== branding tests =====

    fn branded_form() -> PayslipFormState {
        let mut form = sample_form();
        form.brand_color = Some("#2563eb".to_string());
        form.set_asset(AssetSlot::Logo, Some(ImageAsset::restored(PNG_URL.to_string())));
        form.set_asset(AssetSlot::Signature, Some(ImageAsset::restored(PNG_URL.to_string())));
        form
    }

    fn images(ops: &[DrawOp]) -> Vec<Rect> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Image { frame, .. } => Some(*frame),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn entitled_render_includes_logo_signature_and_brand() {
        let ops = render(&branded_form(), RecordingBackend::new(), true).unwrap();

        assert_eq!(images(&ops), vec![
            Rect::new(20.0, 8.0, 26.0, 12.0),
            Rect::new(SIGNATURE_LEFT, images(&ops)[1].y, 35.0, 10.0),
        ]);
        match text_op(&ops, "Acme Ltd") {
            Some(DrawOp::Text { style, at, .. }) => {
                assert_eq!(style.color, Rgb::new(37, 99, 235));
                assert_eq!(at.y, 29.0);
            }
            other => panic!("company name not drawn: {other:?}"),
        }
    }

    #[test]
    fn unentitled_render_ignores_branding() {
        let ops = render(&branded_form(), RecordingBackend::new(), false).unwrap();

        assert!(images(&ops).is_empty());
        assert!(!texts(&ops).contains(&"Authorized Signature"));
        match text_op(&ops, "Acme Ltd") {
            Some(DrawOp::Text { style, at, .. }) => {
                assert_eq!(style.color, Rgb::BRAND_GREEN);
                assert_eq!(at.y, 13.0);
            }
            other => panic!("company name not drawn: {other:?}"),
        }
    }

    #[test]
    fn image_failures_are_not_fatal() {
        let ops = render(&branded_form(), RecordingBackend::new().rejecting_images(), true).unwrap();

        assert!(images(&ops).is_empty());
        match text_op(&ops, "Acme Ltd") {
            Some(DrawOp::Text { at, .. }) => assert_eq!(at.y, 21.0),
            other => panic!("company name not drawn: {other:?}"),
        }
        let footer_line_y = ops
            .iter()
            .rev()
            .find_map(|op| match op {
                DrawOp::Line { from, to, .. } if from.x == LEFT_MARGIN && to.x == PAGE_RIGHT => {
                    Some(from.y)
                }
                _ => None,
            })
            .unwrap();
        match text_op(&ops, "Authorized Signature") {
            Some(DrawOp::Text { at, .. }) => assert_eq!(at.y, footer_line_y + 5.0),
            other => panic!("signature caption not drawn: {other:?}"),
        }
    }

    #[test]
    fn undecodable_data_url_is_skipped() {
        let mut form = sample_form();
        form.set_asset(AssetSlot::Logo, Some(ImageAsset::restored("data:nonsense".to_string())));

        let ops = render(&form, RecordingBackend::new(), true).unwrap();

        assert!(images(&ops).is_empty());
    }

    #[test]
    fn other_backend_failures_abort() {
        let result = render(&sample_form(), RecordingBackend::new().failing_on_text("NET PAY"), false);

        assert!(matches!(result, Err(DocumentError::Draw { primitive: "text", .. })));
    }

    // ===== agreement with preview =====

    #[test]
    fn document_and_preview_show_the_same_amounts() {
        let form = PayslipFormState {
            pay_rate: "1234567.891".to_string(),
            health_insurance: "999.995".to_string(),
            ..sample_form()
        };
        let totals = calculate(&form).unwrap();
        let options = options(false);

        let preview = render_preview(&form, &totals, &options);
        let ops = render_document(RecordingBackend::new(), &form, &totals, &options).unwrap();

        let document_amounts: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    text,
                    align: TextAlign::Right,
                    ..
                } if is_amount(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(document_amounts, preview.amounts());
    }
}
