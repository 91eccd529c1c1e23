//! The editing session behind the payslip form.
//!
//! A [`PayslipSession`] owns the form, keeps totals current on every edit,
//! autosaves drafts, debounces what the preview shows, sequences image
//! uploads and lets one export run at a time.

mod debounce;
mod gate;
mod upload;

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use gate::{ExportGate, ExportTicket};
pub use upload::{
    EncodedUpload, PendingUpload, UploadOutcome, UploadSequencer, UploadStart, UploadTicket,
};

use crate::access::Entitlement;
use crate::assets::{AssetEncoder, AssetError};
use crate::calculations::calculate_or_zero;
use crate::draft::DraftStore;
use crate::models::{
    AssetFile, AssetSlot, CalculationTotals, DynamicRow, ImageAsset, PayslipFormState, RowId,
    RowList,
};
use crate::render::{
    BackendFactory, ExportError, ExportedPdf, PreviewPane, RenderOptions, export_payslip,
};

const BRAND_COLOR_FEATURE: &str = "Brand Color";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{feature} is a Pro feature")]
    NotEntitled {
        feature: &'static str,
        redirect: &'static str,
    },

    #[error("could not read the {slot} image: {source}")]
    AssetEncode {
        slot: AssetSlot,
        #[source]
        source: AssetError,
    },

    #[error("row {0} not found")]
    RowNotFound(RowId),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub struct PayslipSession {
    form: PayslipFormState,
    totals: CalculationTotals,
    drafts: DraftStore,
    entitlement: Entitlement,
    debouncer: Debouncer<PayslipFormState>,
    settled: PayslipFormState,
    uploads: UploadSequencer,
    export_gate: ExportGate,
}

impl PayslipSession {
    pub fn new(
        drafts: DraftStore,
        entitlement: Entitlement,
    ) -> Self {
        let form = PayslipFormState::default();
        Self {
            totals: calculate_or_zero(&form),
            settled: form.clone(),
            form,
            drafts,
            entitlement,
            debouncer: Debouncer::default(),
            uploads: UploadSequencer::new(),
            export_gate: ExportGate::new(),
        }
    }

    pub fn with_debounce(
        mut self,
        delay: Duration,
    ) -> Self {
        self.debouncer = Debouncer::new(delay);
        self
    }

    /// Replaces the form with the stored draft merged over the defaults.
    pub async fn hydrate(&mut self) {
        let snapshot = self.drafts.load().await;
        let restored = !snapshot.is_empty();
        self.form = snapshot.into_form_state();
        self.totals = calculate_or_zero(&self.form);
        self.settled = self.form.clone();
        self.debouncer.flush();
        info!(restored, "payslip session hydrated");
    }

    pub fn form(&self) -> &PayslipFormState {
        &self.form
    }

    pub fn totals(&self) -> &CalculationTotals {
        &self.totals
    }

    /// The state the preview last settled on.
    pub fn settled(&self) -> &PayslipFormState {
        &self.settled
    }

    pub fn entitlement(&self) -> Entitlement {
        self.entitlement
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn export_gate(&self) -> &ExportGate {
        &self.export_gate
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::today(self.entitlement.is_entitled())
    }

    /// Applies an edit to the form.
    ///
    /// Branding the user is not entitled to is left as it was.
    pub async fn update<F>(
        &mut self,
        edit: F,
    ) where
        F: FnOnce(&mut PayslipFormState),
    {
        let branding = (!self.entitlement.is_entitled()).then(|| {
            (
                self.form.brand_color.clone(),
                self.form.logo.clone(),
                self.form.signature.clone(),
                self.form.signature_file_name.clone(),
            )
        });

        edit(&mut self.form);

        if let Some((brand_color, logo, signature, signature_file_name)) = branding {
            self.form.brand_color = brand_color;
            self.form.logo = logo;
            self.form.signature = signature;
            self.form.signature_file_name = signature_file_name;
        }

        self.changed().await;
    }

    /// Moves the preview forward once input has been quiet long enough.
    /// Returns `true` when there is a new settled state to render.
    pub fn tick(
        &mut self,
        now: Instant,
    ) -> bool {
        match self.debouncer.poll(now) {
            Some(settled) => {
                self.settled = settled;
                true
            }
            None => false,
        }
    }

    /// Settles the preview immediately.
    pub fn settle_now(&mut self) {
        if let Some(settled) = self.debouncer.flush() {
            self.settled = settled;
        }
    }

    pub async fn set_brand_color(
        &mut self,
        color: Option<String>,
    ) -> Result<(), SessionError> {
        self.require(BRAND_COLOR_FEATURE)?;
        self.form.brand_color = color.filter(|color| !color.trim().is_empty());
        self.changed().await;
        Ok(())
    }

    pub async fn add_row(
        &mut self,
        list: RowList,
        label: &str,
    ) -> RowId {
        let row = DynamicRow::new(label, "");
        let id = row.id.clone();
        self.form.rows_mut(list).push(row);
        self.changed().await;
        id
    }

    pub async fn set_row_label(
        &mut self,
        list: RowList,
        id: &RowId,
        label: &str,
    ) -> Result<(), SessionError> {
        self.edit_row(list, id, |row| row.label = label.to_string())
            .await
    }

    pub async fn set_row_amount(
        &mut self,
        list: RowList,
        id: &RowId,
        amount: &str,
    ) -> Result<(), SessionError> {
        self.edit_row(list, id, |row| row.amount = amount.to_string())
            .await
    }

    pub async fn remove_row(
        &mut self,
        list: RowList,
        id: &RowId,
    ) -> Result<(), SessionError> {
        let rows = self.form.rows_mut(list);
        let before = rows.len();
        rows.retain(|row| &row.id != id);
        if rows.len() == before {
            return Err(SessionError::RowNotFound(id.clone()));
        }
        self.changed().await;
        Ok(())
    }

    /// Accepts a file for a branding slot and issues its ticket.
    pub fn begin_upload(
        &mut self,
        slot: AssetSlot,
        file: AssetFile,
    ) -> Result<UploadStart, SessionError> {
        self.require(slot.feature_name())?;
        Ok(match self.uploads.begin(slot, file.fingerprint()) {
            Some(ticket) => UploadStart::Started(PendingUpload { ticket, file }),
            None => UploadStart::Duplicate,
        })
    }

    /// Applies an encoded upload if no later upload or removal superseded it.
    pub async fn complete_upload(
        &mut self,
        encoded: EncodedUpload,
    ) -> Result<UploadOutcome, SessionError> {
        let slot = encoded.ticket.slot();
        if !self.uploads.finish(&encoded.ticket) {
            debug!(%slot, file = %encoded.file.name, "discarding superseded upload");
            return Ok(UploadOutcome::Stale);
        }

        let data_url = encoded.result.map_err(|source| {
            warn!(error = %source, %slot, file = %encoded.file.name, "image upload failed");
            SessionError::AssetEncode { slot, source }
        })?;

        self.drafts.save_image(slot, Some(&data_url)).await;
        self.form
            .set_asset(slot, Some(ImageAsset::uploaded(encoded.file, data_url)));
        self.changed().await;
        Ok(UploadOutcome::Applied)
    }

    /// Begins, encodes and completes an upload in one call.
    pub async fn upload(
        &mut self,
        slot: AssetSlot,
        file: AssetFile,
        encoder: &dyn AssetEncoder,
    ) -> Result<UploadOutcome, SessionError> {
        match self.begin_upload(slot, file)? {
            UploadStart::Started(pending) => {
                let encoded = pending.encode(encoder).await;
                self.complete_upload(encoded).await
            }
            UploadStart::Duplicate => Ok(UploadOutcome::Ignored),
        }
    }

    /// Clears an image and its stored copy. Uploads still encoding for the
    /// slot will not be applied.
    pub async fn remove_asset(
        &mut self,
        slot: AssetSlot,
    ) {
        self.uploads.invalidate(slot);
        self.form.set_asset(slot, None);
        self.drafts.save_image(slot, None).await;
        self.changed().await;
    }

    pub fn preview(&self) -> PreviewPane {
        PreviewPane::build(
            &self.form,
            &self.settled,
            &self.totals,
            &self.render_options(),
        )
    }

    pub fn validate_for_export(&self) -> Result<(), Vec<String>> {
        self.form.validate_for_export()
    }

    /// Renders the current form to a document on a blocking task.
    ///
    /// # Errors
    ///
    /// Fails with [`ExportError::Incomplete`] when required fields are
    /// missing, [`ExportError::Busy`] while another export runs, and with
    /// the rendering error otherwise. The gate reopens either way.
    pub async fn export_pdf<F>(
        &self,
        factory: F,
    ) -> Result<ExportedPdf, SessionError>
    where
        F: BackendFactory + 'static,
    {
        self.validate_for_export()
            .map_err(ExportError::Incomplete)?;
        let ticket = self.export_gate.try_begin().ok_or(ExportError::Busy)?;

        let form = self.form.clone();
        let totals = self.totals.clone();
        let options = self.render_options();

        let exported = tokio::task::spawn_blocking(move || {
            let _ticket = ticket;
            export_payslip(&factory, &form, &totals, &options, Utc::now())
        })
        .await
        .map_err(|error| ExportError::Task(error.to_string()))??;

        Ok(exported)
    }

    /// Forgets the stored draft and starts over with an empty form.
    pub async fn clear_draft(&mut self) {
        self.drafts.clear().await;
        for slot in AssetSlot::ALL {
            self.uploads.invalidate(slot);
        }
        self.form = PayslipFormState::default();
        self.totals = calculate_or_zero(&self.form);
        self.settled = self.form.clone();
        self.debouncer.flush();
        info!("payslip draft cleared");
    }

    fn require(
        &self,
        feature: &'static str,
    ) -> Result<(), SessionError> {
        match self.entitlement {
            Entitlement::Entitled => Ok(()),
            Entitlement::Denied { redirect } => {
                debug!(feature, redirect, "blocked pro feature");
                Err(SessionError::NotEntitled { feature, redirect })
            }
        }
    }

    async fn edit_row(
        &mut self,
        list: RowList,
        id: &RowId,
        edit: impl FnOnce(&mut DynamicRow),
    ) -> Result<(), SessionError> {
        let row = self
            .form
            .row_mut(list, id)
            .ok_or_else(|| SessionError::RowNotFound(id.clone()))?;
        edit(row);
        self.changed().await;
        Ok(())
    }

    async fn changed(&mut self) {
        self.totals = calculate_or_zero(&self.form);
        self.debouncer.push(self.form.clone(), Instant::now());
        self.drafts.save_fields(&self.form).await;
    }
}
