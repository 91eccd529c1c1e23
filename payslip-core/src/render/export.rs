use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use super::RenderOptions;
use super::backend::{DocumentBackend, DocumentError};
use super::pdf::render_document;
use crate::models::{CalculationTotals, PayslipFormState};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to generate PDF: {0}")]
    Document(#[from] DocumentError),

    #[error("payslip is incomplete: {}", .0.join("; "))]
    Incomplete(Vec<String>),

    #[error("an export is already in progress")]
    Busy,

    #[error("export task failed: {0}")]
    Task(String),
}

/// Creates a fresh document backend for each export.
///
/// Backends are created on the thread that renders, so the factory is the
/// only part that has to cross threads.
pub trait BackendFactory: Send + Sync {
    type Backend: DocumentBackend<Output = Vec<u8>>;

    fn create(
        &self,
        title: &str,
    ) -> Result<Self::Backend, DocumentError>;
}

/// A finished payslip document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `payslip-<employee>-<unix millis>.pdf`
pub fn export_file_name(
    employee_name: &str,
    generated_at: DateTime<Utc>,
) -> String {
    format!(
        "payslip-{}-{}.pdf",
        employee_name.trim(),
        generated_at.timestamp_millis()
    )
}

/// Renders and finishes a payslip document in one go.
///
/// # Errors
///
/// Returns [`ExportError::Document`] if the backend cannot be created, a
/// non-image primitive fails, or the document cannot be finalised. Nothing
/// is returned for a partially drawn document.
pub fn export_payslip<F: BackendFactory>(
    factory: &F,
    form: &PayslipFormState,
    totals: &CalculationTotals,
    options: &RenderOptions,
    generated_at: DateTime<Utc>,
) -> Result<ExportedPdf, ExportError> {
    let file_name = export_file_name(&form.employee_name, generated_at);
    let title = format!("Payslip - {}", form.employee_name.trim());

    let result = factory
        .create(&title)
        .and_then(|backend| render_document(backend, form, totals, options));

    match result {
        Ok(bytes) => {
            info!(file = %file_name, bytes = bytes.len(), "generated payslip document");
            Ok(ExportedPdf { file_name, bytes })
        }
        Err(err) => {
            error!(error = %err, file = %file_name, "payslip document generation failed");
            Err(err.into())
        }
    }
}
