use std::sync::Arc;

use tracing::{debug, warn};

use super::storage::DraftStorage;
use crate::models::{AssetSlot, ImageAsset, PayslipFormState};

pub const DEFAULT_NAMESPACE: &str = "complyn.home.payslipDraft";

/// The three storage keys a draft occupies: one for the form fields and one
/// per branding image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftKeys {
    pub fields: String,
    pub logo: String,
    pub signature: String,
}

impl DraftKeys {
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            fields: namespace.to_string(),
            logo: format!("{namespace}-logo"),
            signature: format!("{namespace}-signature"),
        }
    }

    pub fn image(
        &self,
        slot: AssetSlot,
    ) -> &str {
        match slot {
            AssetSlot::Logo => &self.logo,
            AssetSlot::Signature => &self.signature,
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.fields, &self.logo, &self.signature]
    }
}

impl Default for DraftKeys {
    fn default() -> Self {
        Self::for_namespace(DEFAULT_NAMESPACE)
    }
}

/// Whatever could be read back from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub fields: Option<PayslipFormState>,
    pub logo_data_url: Option<String>,
    pub signature_data_url: Option<String>,
}

impl DraftSnapshot {
    pub fn is_empty(&self) -> bool {
        self.fields.is_none() && self.logo_data_url.is_none() && self.signature_data_url.is_none()
    }

    /// The form to resume editing: stored fields over defaults, plus any
    /// stored images as restored assets.
    pub fn into_form_state(self) -> PayslipFormState {
        let mut form = self.fields.unwrap_or_default();
        form.ensure_unique_row_ids();
        if let Some(url) = self.logo_data_url {
            form.set_asset(AssetSlot::Logo, Some(ImageAsset::restored(url)));
        }
        if let Some(url) = self.signature_data_url {
            form.set_asset(AssetSlot::Signature, Some(ImageAsset::restored(url)));
        }
        form
    }
}

/// Saves and restores payslip drafts.
///
/// Persistence is best-effort: storage failures are logged and swallowed so
/// editing never stops because the disk is full or the store is unavailable.
#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn DraftStorage>,
    keys: DraftKeys,
}

impl DraftStore {
    pub fn new(
        storage: Arc<dyn DraftStorage>,
        keys: DraftKeys,
    ) -> Self {
        Self { storage, keys }
    }

    pub fn with_default_keys(storage: Arc<dyn DraftStorage>) -> Self {
        Self::new(storage, DraftKeys::default())
    }

    pub fn keys(&self) -> &DraftKeys {
        &self.keys
    }

    /// Persists the form fields and both branding images.
    pub async fn save(
        &self,
        form: &PayslipFormState,
    ) {
        self.save_fields(form).await;
        for slot in AssetSlot::ALL {
            self.save_image(slot, form.asset(slot).map(ImageAsset::data_url))
                .await;
        }
    }

    /// Persists only the non-binary fields. Images are excluded from the
    /// serialized form and never touched here.
    pub async fn save_fields(
        &self,
        form: &PayslipFormState,
    ) {
        let json = match serde_json::to_string(form) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "failed to serialize payslip draft");
                return;
            }
        };

        match self.storage.set(&self.keys.fields, &json).await {
            Ok(()) => debug!(key = %self.keys.fields, bytes = json.len(), "saved payslip draft"),
            Err(error) => warn!(%error, key = %self.keys.fields, "failed to save payslip draft"),
        }
    }

    /// Stores one image's data-URL, or removes the key when there is none.
    pub async fn save_image(
        &self,
        slot: AssetSlot,
        data_url: Option<&str>,
    ) {
        let key = self.keys.image(slot);
        let result = match data_url.filter(|url| !url.is_empty()) {
            Some(url) => self.storage.set(key, url).await,
            None => self.storage.remove(key).await,
        };

        if let Err(error) = result {
            warn!(%error, %key, %slot, "failed to persist draft image");
        }
    }

    /// Reads the stored draft. Missing or unreadable parts come back empty.
    pub async fn load(&self) -> DraftSnapshot {
        let fields = match self.read(&self.keys.fields).await {
            Some(raw) => match serde_json::from_str::<PayslipFormState>(&raw) {
                Ok(form) => Some(form),
                Err(error) => {
                    warn!(%error, key = %self.keys.fields, "discarding malformed payslip draft");
                    None
                }
            },
            None => None,
        };

        let snapshot = DraftSnapshot {
            fields,
            logo_data_url: self.read(&self.keys.logo).await,
            signature_data_url: self.read(&self.keys.signature).await,
        };
        debug!(empty = snapshot.is_empty(), "loaded payslip draft");
        snapshot
    }

    /// Removes every key the draft occupies.
    pub async fn clear(&self) {
        for key in self.keys.all() {
            if let Err(error) = self.storage.remove(key).await {
                warn!(%error, %key, "failed to clear draft key");
            }
        }
    }

    async fn read(
        &self,
        key: &str,
    ) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(error) => {
                warn!(%error, %key, "failed to read draft key");
                None
            }
        }
    }
}
