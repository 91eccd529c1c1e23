//! Payslip calculation, drafting and rendering.
//!
//! [`calculations`] turns a [`PayslipFormState`] into [`CalculationTotals`],
//! [`render`] draws both into a preview or a document, [`draft`] persists
//! work in progress and [`session`] ties them together behind the form.

pub mod access;
pub mod assets;
pub mod calculations;
pub mod draft;
pub mod format;
pub mod models;
pub mod render;
pub mod session;

pub use access::{AccessDecision, AccountDirectory, Entitlement, check_company_access};
pub use calculations::{CalcError, calculate, calculate_or_zero, parse_money, parse_percentage};
pub use draft::{DraftStorage, DraftStore, StorageError};
pub use format::format_money;
pub use models::*;
pub use render::{DocumentBackend, ExportError, PreviewPane, RenderOptions};
pub use session::{PayslipSession, SessionError};
