//! Loading payslip forms from disk.
//!
//! Files use the same field names as the stored draft, in TOML or JSON
//! chosen by extension:
//!
//! ```toml
//! companyName = "Acme Ltd"
//! employeeName = "Ada Obi"
//! payRate = "150000"
//! tax = "10%"
//!
//! [period]
//! type = "month"
//! month = "03"
//! year = "2025"
//!
//! [[allowances]]
//! label = "Transport"
//! amount = "20000"
//! ```

use std::io;
use std::path::{Path, PathBuf};

use payslip_core::models::PayslipFormState;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a form file.
#[derive(Debug, Error)]
pub enum FormFileError {
    #[error("cannot read form file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Only `.toml` and `.json` are understood.
    #[error("unsupported form file extension '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFormat {
    Toml,
    Json,
}

impl FormFormat {
    pub fn from_path(path: &Path) -> Result<Self, FormFileError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(FormFileError::UnsupportedFormat(extension)),
        }
    }
}

/// Parse form text. Missing fields take their defaults and rows without an
/// id are given one.
pub fn load_from_str(
    input: &str,
    format: FormFormat,
) -> Result<PayslipFormState, FormFileError> {
    let mut form: PayslipFormState = match format {
        FormFormat::Toml => toml::from_str(input)?,
        FormFormat::Json => serde_json::from_str(input)?,
    };
    form.ensure_unique_row_ids();
    Ok(form)
}

pub fn load_from_file(path: &Path) -> Result<PayslipFormState, FormFileError> {
    let format = FormFormat::from_path(path)?;
    let input = std::fs::read_to_string(path).map_err(|source| FormFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let form = load_from_str(&input, format)?;
    debug!(path = %path.display(), employee = %form.employee_name, "loaded form file");
    Ok(form)
}
