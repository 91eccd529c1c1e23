//! Command implementations behind the `payslip` binary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use payslip_core::access::Entitlement;
use payslip_core::assets::Base64Encoder;
use payslip_core::draft::{DraftKeys, DraftStorage, DraftStore, MemoryStorage, StorageRegistry};
use payslip_core::format::{format_money, pay_period_label};
use payslip_core::models::{AssetFile, AssetSlot, CalculationTotals, PayslipFormState};
use payslip_core::render::PreviewPane;
use payslip_core::session::{PayslipSession, UploadOutcome};
use payslip_db_sqlite::SqliteStorageFactory;
use payslip_pdf::PrintPdfFactory;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::form_file;

/// Every storage backend the binary can use.
pub fn build_registry() -> StorageRegistry {
    let mut registry = StorageRegistry::with_memory();
    registry.register(Box::new(SqliteStorageFactory));
    registry
}

/// Opens the configured draft store.
pub async fn open_drafts(config: &AppConfig) -> Result<DraftStore> {
    let storage_config = config.storage.storage_config();
    debug!(backend = %storage_config.backend, "opening draft storage");

    let storage: Arc<dyn DraftStorage> = build_registry()
        .create(&storage_config)
        .await
        .with_context(|| format!("cannot open '{}' draft storage", storage_config.backend))?
        .into();
    Ok(DraftStore::new(
        storage,
        DraftKeys::for_namespace(&config.storage.namespace),
    ))
}

/// A session over `form`, or over the saved draft when no form is given.
///
/// Forms read from a file are edited in scratch storage so the saved draft
/// is left alone.
pub async fn open_session(
    config: &AppConfig,
    form_path: Option<&Path>,
) -> Result<PayslipSession> {
    let entitlement = Entitlement::from_flag(config.account.entitled);

    match form_path {
        Some(path) => {
            let form = form_file::load_from_file(path)?;
            let scratch = DraftStore::with_default_keys(Arc::new(MemoryStorage::new()));
            let mut session = PayslipSession::new(scratch, entitlement);
            session.update(|current| *current = form).await;
            session.settle_now();
            Ok(session)
        }
        None => {
            let mut session = PayslipSession::new(open_drafts(config).await?, entitlement);
            session.hydrate().await;
            Ok(session)
        }
    }
}

/// Totals as printed by `payslip calc`.
pub struct TotalsReport<'a> {
    pub form: &'a PayslipFormState,
    pub totals: &'a CalculationTotals,
}

impl fmt::Display for TotalsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.totals;
        let employee = match self.form.employee_name.trim() {
            "" => "(unnamed employee)",
            name => name,
        };
        let period = pay_period_label(&self.form.period).unwrap_or_else(|| "Not specified".to_string());

        writeln!(f, "{employee}, {period}")?;
        let rows = [
            ("Basic earnings", t.basic_earnings),
            ("Overtime", t.overtime_earnings),
            ("Allowances", t.allowances_total),
            ("Bonuses", t.bonuses_total),
            ("Gross pay", t.gross),
            ("Tax", t.tax_val),
            ("Pension", t.pension_val),
            ("Health insurance", t.health_val),
            ("Other deductions", t.other_deduction_total),
            ("Total deductions", t.total_deductions),
            ("Net pay", t.net),
        ];
        for (label, amount) in rows {
            writeln!(f, "  {label:<18}{:>18}", format_money(amount))?;
        }
        Ok(())
    }
}

pub async fn calc(
    config: &AppConfig,
    form_path: Option<&Path>,
) -> Result<String> {
    let session = open_session(config, form_path).await?;
    let report = TotalsReport {
        form: session.form(),
        totals: session.totals(),
    };
    Ok(report.to_string())
}

/// Renders the preview as text, or writes it as HTML to `html_out`.
pub async fn preview(
    config: &AppConfig,
    form_path: Option<&Path>,
    html_out: Option<&Path>,
) -> Result<String> {
    let session = open_session(config, form_path).await?;
    let pane = session.preview();

    let Some(out) = html_out else {
        return Ok(pane.to_string());
    };
    let PreviewPane::Ready(view) = pane else {
        bail!("nothing to preview: enter both the employee and company names");
    };
    std::fs::write(out, view.to_html())
        .with_context(|| format!("cannot write preview to '{}'", out.display()))?;
    info!(path = %out.display(), "wrote HTML preview");
    Ok(format!("Preview written to {}", out.display()))
}

/// Branding images to attach to an export.
#[derive(Debug, Default)]
pub struct Branding<'a> {
    pub logo: Option<&'a Path>,
    pub signature: Option<&'a Path>,
}

pub async fn export(
    config: &AppConfig,
    form_path: Option<&Path>,
    out_dir: Option<&Path>,
    branding: Branding<'_>,
) -> Result<PathBuf> {
    let mut session = open_session(config, form_path).await?;

    for (slot, path) in [
        (AssetSlot::Logo, branding.logo),
        (AssetSlot::Signature, branding.signature),
    ] {
        let Some(path) = path else { continue };
        let file = AssetFile::from_path(path)
            .with_context(|| format!("cannot read {slot} image '{}'", path.display()))?;
        match session.upload(slot, file, &Base64Encoder).await {
            Ok(UploadOutcome::Applied) => debug!(%slot, "attached image"),
            Ok(outcome) => warn!(%slot, ?outcome, "image was not attached"),
            Err(error) => warn!(%error, %slot, "skipping image"),
        }
    }

    let exported = session.export_pdf(PrintPdfFactory).await?;

    let dir = out_dir.unwrap_or(&config.export.output_dir);
    let path = dir.join(&exported.file_name);
    std::fs::write(&path, &exported.bytes)
        .with_context(|| format!("cannot write '{}'", path.display()))?;
    info!(path = %path.display(), bytes = exported.bytes.len(), "exported payslip");
    Ok(path)
}

pub async fn draft_save(
    config: &AppConfig,
    form_path: &Path,
) -> Result<String> {
    let form = form_file::load_from_file(form_path)?;
    let drafts = open_drafts(config).await?;
    drafts.save(&form).await;
    Ok(format!("Draft saved from {}", form_path.display()))
}

pub async fn draft_show(config: &AppConfig) -> Result<String> {
    let snapshot = open_drafts(config).await?.load().await;
    if snapshot.is_empty() {
        return Ok("No saved draft".to_string());
    }
    let has_logo = snapshot.logo_data_url.is_some();
    let has_signature = snapshot.signature_data_url.is_some();
    let form = snapshot.into_form_state();

    let mut out = serde_json::to_string_pretty(&form).context("cannot display draft")?;
    out.push_str(&format!("\nlogo: {has_logo}, signature: {has_signature}"));
    Ok(out)
}

pub async fn draft_clear(config: &AppConfig) -> Result<String> {
    open_drafts(config).await?.clear().await;
    Ok("Draft cleared".to_string())
}
