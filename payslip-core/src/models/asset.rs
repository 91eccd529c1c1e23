use std::fmt;
use std::io;
use std::path::Path;

/// Which branding image an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    Logo,
    Signature,
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 2] = [AssetSlot::Logo, AssetSlot::Signature];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Signature => "signature",
        }
    }

    /// Name of the paid feature the slot unlocks.
    pub fn feature_name(&self) -> &'static str {
        match self {
            Self::Logo => "Company Logo",
            Self::Signature => "Digital Signature",
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AssetFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads an image from disk, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_from_extension(path);

        Ok(Self::new(name, mime_type, bytes))
    }

    /// Cheap identity used to recognise the same file being selected twice.
    pub fn fingerprint(&self) -> (String, usize) {
        (self.name.clone(), self.bytes.len())
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// A branding image: the uploaded file (when this session uploaded it) and
/// the data-URL derived from it. A restored draft only carries the URL.
///
/// The pair is only constructed together, so the file and its URL cannot
/// drift apart; clearing the asset means dropping the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    file: Option<AssetFile>,
    data_url: String,
}

impl ImageAsset {
    pub fn uploaded(file: AssetFile, data_url: String) -> Self {
        Self {
            file: Some(file),
            data_url,
        }
    }

    pub fn restored(data_url: String) -> Self {
        Self {
            file: None,
            data_url,
        }
    }

    pub fn file(&self) -> Option<&AssetFile> {
        self.file.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name.as_str())
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn restored_asset_has_no_file() {
        let asset = ImageAsset::restored("data:image/png;base64,AAAA".to_string());

        assert!(asset.file().is_none());
        assert_eq!(asset.data_url(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn uploaded_asset_keeps_file_name() {
        let file = AssetFile::new("logo.png", "image/png", vec![1, 2, 3]);
        let asset = ImageAsset::uploaded(file, "data:image/png;base64,AQID".to_string());

        assert_eq!(asset.file_name(), Some("logo.png"));
    }

    #[test]
    fn fingerprint_uses_name_and_size() {
        let file = AssetFile::new("sig.jpg", "image/jpeg", vec![0; 42]);

        assert_eq!(file.fingerprint(), ("sig.jpg".to_string(), 42));
    }

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a/b/Logo.PNG")), "image/png");
        assert_eq!(mime_from_extension(Path::new("sig.jpeg")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("notes")), "application/octet-stream");
    }
}
