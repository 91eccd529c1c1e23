//! Payslip rendering: an on-screen preview and a fixed-layout A4 document.
//! Both draw from the same form and totals and format every amount with
//! [`format_money`](crate::format::format_money).

pub mod backend;
pub mod color;
pub mod export;
pub mod metrics;
pub mod pdf;
pub mod preview;

use chrono::{Local, NaiveDate};

pub use backend::{
    DocumentBackend, DocumentError, DrawOp, FontWeight, Point, Rect, RecordingBackend, TextAlign,
    TextStyle,
};
pub use color::Rgb;
pub use export::{BackendFactory, ExportError, ExportedPdf, export_file_name, export_payslip};
pub use pdf::{PdfRenderer, render_document};
pub use preview::{PayslipView, PreviewPane, render_preview};

use crate::models::{AssetSlot, ImageAsset, PayslipFormState};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₦";

/// Settings shared by both renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whether paid branding (colour, logo, signature) may be shown.
    pub entitled: bool,
    pub generated_on: NaiveDate,
    /// Prefix for amounts in the preview. Documents use bare figures.
    pub currency_symbol: String,
}

impl RenderOptions {
    pub fn new(
        entitled: bool,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            entitled,
            generated_on,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    pub fn today(entitled: bool) -> Self {
        Self::new(entitled, Local::now().date_naive())
    }

    /// The colour sections are drawn in. Unentitled users always get the
    /// default green.
    pub fn brand_color(
        &self,
        form: &PayslipFormState,
    ) -> Rgb {
        if self.entitled {
            Rgb::brand(form.brand_color.as_deref())
        } else {
            Rgb::BRAND_GREEN
        }
    }

    /// A branding image, only when the user may show it.
    pub fn asset<'a>(
        &self,
        form: &'a PayslipFormState,
        slot: AssetSlot,
    ) -> Option<&'a ImageAsset> {
        if self.entitled { form.asset(slot) } else { None }
    }
}
