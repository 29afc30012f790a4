//! Upload intake: MIME resolution, size policy, and preview encoding.

use std::path::Path;

use bytes::Bytes;
use scriptscan_core::{ImagePayload, ScriptScanError};
use thiserror::Error;
use tracing::{debug, info};

use crate::mime_detect::{detect_mime_type, is_image, sniff_image_mime};

/// The 10 MB guideline shown on the upload form.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("no image data supplied")]
    Empty,

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("image is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<IntakeError> for ScriptScanError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Read { .. } => ScriptScanError::Read(err.to_string()),
            other => ScriptScanError::Input(other.to_string()),
        }
    }
}

/// Limits applied to an incoming image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    /// `None` keeps the size guideline advisory.
    pub max_bytes: Option<usize>,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            max_bytes: Some(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }
}

impl IntakePolicy {
    pub fn advisory() -> Self {
        Self { max_bytes: None }
    }
}

/// A user-supplied image held in memory for preview and transmission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    /// Accept raw bytes from a picker, a drop, or an API body.
    ///
    /// The MIME type is taken from the declared type when it is an image,
    /// otherwise from the magic bytes, otherwise from the file extension.
    pub fn from_bytes(
        file_name: impl Into<String>,
        declared_mime: Option<&str>,
        data: impl Into<Bytes>,
        policy: &IntakePolicy,
    ) -> Result<Self, IntakeError> {
        let file_name = file_name.into();
        let data = data.into();

        if data.is_empty() {
            return Err(IntakeError::Empty);
        }
        if let Some(limit) = policy.max_bytes {
            if data.len() > limit {
                return Err(IntakeError::TooLarge { size: data.len(), limit });
            }
        }

        let mime_type = resolve_mime(&file_name, declared_mime, &data)?;
        debug!(file = %file_name, mime = %mime_type, size = data.len(), "Accepted image upload");

        Ok(Self { file_name, mime_type, data })
    }

    /// Read an image from disk.
    pub async fn from_path(path: &Path, policy: &IntakePolicy) -> Result<Self, IntakeError> {
        let data = tokio::fs::read(path).await.map_err(|source| IntakeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        info!(path = %path.display(), size = data.len(), "Read image from disk");
        Self::from_bytes(file_name, None, data, policy)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The transmission payload. Cloning `Bytes` is a refcount bump.
    pub fn payload(&self) -> ImagePayload {
        ImagePayload::new(self.mime_type.clone(), self.data.clone())
    }
}

fn resolve_mime(file_name: &str, declared: Option<&str>, data: &[u8]) -> Result<String, IntakeError> {
    if let Some(declared) = declared.map(str::trim).filter(|m| is_image(m)) {
        return Ok(declared.to_ascii_lowercase());
    }
    if let Some(sniffed) = sniff_image_mime(data) {
        return Ok(sniffed.to_string());
    }
    let by_extension = detect_mime_type(Path::new(file_name));
    if is_image(by_extension) {
        return Ok(by_extension.to_string());
    }
    Err(IntakeError::UnsupportedType(
        declared.unwrap_or(by_extension).to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn declared_image_type_wins() {
        let upload =
            ImageUpload::from_bytes("rx.bin", Some("image/jpeg"), vec![1u8, 2, 3], &IntakePolicy::default())
                .unwrap();
        assert_eq!(upload.mime_type, "image/jpeg");
    }

    #[test]
    fn sniffs_when_declared_type_is_generic() {
        let upload = ImageUpload::from_bytes(
            "upload",
            Some("application/octet-stream"),
            PNG_HEADER.to_vec(),
            &IntakePolicy::default(),
        )
        .unwrap();
        assert_eq!(upload.mime_type, "image/png");
    }

    #[test]
    fn falls_back_to_extension() {
        let upload =
            ImageUpload::from_bytes("scan.heic", None, vec![0u8; 4], &IntakePolicy::default())
                .unwrap();
        assert_eq!(upload.mime_type, "image/heic");
    }

    #[test]
    fn rejects_non_images() {
        let err = ImageUpload::from_bytes("notes.txt", Some("text/plain"), b"hi".to_vec(), &IntakePolicy::default())
            .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType(ref m) if m == "text/plain"));
        assert!(matches!(ScriptScanError::from(err), ScriptScanError::Input(_)));
    }

    #[test]
    fn rejects_empty_payload() {
        let err = ImageUpload::from_bytes("rx.png", None, Vec::<u8>::new(), &IntakePolicy::default()).unwrap_err();
        assert!(matches!(err, IntakeError::Empty));
    }

    #[test]
    fn enforces_size_limit_unless_advisory() {
        let policy = IntakePolicy { max_bytes: Some(4) };
        let err = ImageUpload::from_bytes("rx.png", None, PNG_HEADER.to_vec(), &policy).unwrap_err();
        assert!(matches!(err, IntakeError::TooLarge { size: 8, limit: 4 }));

        let ok = ImageUpload::from_bytes("rx.png", None, PNG_HEADER.to_vec(), &IntakePolicy::advisory());
        assert!(ok.is_ok());
    }

    #[test]
    fn payload_carries_bytes_and_type() {
        let upload =
            ImageUpload::from_bytes("rx.png", Some("image/png"), b"abc".to_vec(), &IntakePolicy::default())
                .unwrap();
        let payload = upload.payload();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.data.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("scriptscan-does-not-exist.png");
        let err = ImageUpload::from_path(&path, &IntakePolicy::default()).await.unwrap_err();
        assert!(matches!(err, IntakeError::Read { .. }));
        assert!(matches!(ScriptScanError::from(err), ScriptScanError::Read(_)));
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("scriptscan-intake-{}.png", std::process::id()));
        tokio::fs::write(&path, PNG_HEADER).await.unwrap();
        let upload = ImageUpload::from_path(&path, &IntakePolicy::default()).await.unwrap();
        assert_eq!(upload.mime_type, "image/png");
        assert!(upload.file_name.starts_with("scriptscan-intake-"));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
