use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ExtractionError, LookupError};
use crate::record::PrescriptionRecord;

/// Raw image bytes plus their MIME type, ready for transmission.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Bytes,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Capability boundary around the external multimodal model.
///
/// Presentation code depends only on this trait, so the provider can be
/// swapped without touching it.
#[async_trait]
pub trait PrescriptionExtractor: Send + Sync {
    /// Provider name (e.g., "gemini", "static").
    fn name(&self) -> &str;

    /// Turn one prescription image into a structured record.
    async fn extract(&self, image: &ImagePayload) -> Result<PrescriptionRecord, ExtractionError>;
}

/// A public drug image reference queried by normalized term.
#[async_trait]
pub trait DrugImageSource: Send + Sync {
    /// Source name for logs (e.g., "rximage").
    fn name(&self) -> &str;

    /// Image URLs for the term, in the source's own order. Empty when nothing matched.
    async fn search(&self, term: &str) -> Result<Vec<String>, LookupError>;
}
