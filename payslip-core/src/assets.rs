//! Conversion between uploaded image files and base64 data-URLs.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::debug;

use crate::models::AssetFile;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("file '{0}' is empty")]
    Empty(String),

    #[error("file '{name}' has unsupported type '{mime_type}', expected an image")]
    UnsupportedType { name: String, mime_type: String },

    #[error("not a base64 data URL")]
    MalformedDataUrl,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Raw image bytes recovered from a data-URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Builds a `data:<mime>;base64,<payload>` URL.
pub fn encode_data_url(
    mime_type: &str,
    bytes: &[u8],
) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Splits a base64 data-URL back into its MIME type and bytes.
pub fn decode_data_url(url: &str) -> Result<DecodedImage, AssetError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or(AssetError::MalformedDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(AssetError::MalformedDataUrl)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(AssetError::MalformedDataUrl)?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AssetError::InvalidBase64(e.to_string()))?;

    Ok(DecodedImage {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Turns an uploaded file into a data-URL. Conversion may be slow for large
/// files, so it is asynchronous and callers must expect results to arrive
/// after later uploads have started.
#[async_trait]
pub trait AssetEncoder: Send + Sync {
    async fn encode(
        &self,
        file: &AssetFile,
    ) -> Result<String, AssetError>;
}

/// Encodes image files as base64 data-URLs.
#[derive(Debug, Clone, Default)]
pub struct Base64Encoder;

#[async_trait]
impl AssetEncoder for Base64Encoder {
    async fn encode(
        &self,
        file: &AssetFile,
    ) -> Result<String, AssetError> {
        if file.bytes.is_empty() {
            return Err(AssetError::Empty(file.name.clone()));
        }
        if !file.mime_type.starts_with("image/") {
            return Err(AssetError::UnsupportedType {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }

        debug!(file = %file.name, bytes = file.bytes.len(), "encoding image as data URL");
        Ok(encode_data_url(&file.mime_type, &file.bytes))
    }
}
