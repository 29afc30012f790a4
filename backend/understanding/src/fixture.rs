use std::time::Duration;

use async_trait::async_trait;
use scriptscan_core::{
    ExtractionError, ImagePayload, PrescriptionExtractor, PrescriptionRecord,
};

use crate::parse::parse_record;

/// An extractor that returns a canned response.
///
/// The canned text goes through the same parser as live responses, so a
/// fixture file exercises the full post-response path offline.
pub struct StaticExtractor {
    name: String,
    response: Result<String, ExtractionError>,
    delay: Option<Duration>,
}

impl StaticExtractor {
    pub fn from_json(text: impl Into<String>) -> Self {
        Self {
            name: "static".to_string(),
            response: Ok(text.into()),
            delay: None,
        }
    }

    pub fn from_record(record: &PrescriptionRecord) -> Self {
        Self {
            name: "static".to_string(),
            response: serde_json::to_string(record).map_err(|e| ExtractionError::Parse(e.to_string())),
            delay: None,
        }
    }

    pub fn failing(error: ExtractionError) -> Self {
        Self {
            name: "static".to_string(),
            response: Err(error),
            delay: None,
        }
    }

    /// Hold each call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl PrescriptionExtractor for StaticExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, _image: &ImagePayload) -> Result<PrescriptionRecord, ExtractionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            Ok(text) => parse_record(text),
            Err(e) => Err(e.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptscan_core::Medication;

    fn payload() -> ImagePayload {
        ImagePayload::new("image/png", vec![1u8])
    }

    #[tokio::test]
    async fn round_trips_a_record() {
        let mut record = PrescriptionRecord { is_prescription: true, ..Default::default() };
        record.medications.push(Medication::named("Dolo 650"));
        let extractor = StaticExtractor::from_record(&record);
        assert_eq!(extractor.response.as_deref(), Ok(serde_json::to_string(&record).unwrap().as_str()));
        assert_eq!(extractor.extract(&payload()).await.unwrap(), record);
    }

    #[tokio::test]
    async fn surfaces_configured_failure() {
        let extractor = StaticExtractor::failing(ExtractionError::Timeout);
        assert_eq!(extractor.extract(&payload()).await, Err(ExtractionError::Timeout));
    }

    #[tokio::test]
    async fn bad_fixture_is_parse_failure() {
        let extractor = StaticExtractor::from_json("[1, 2");
        assert!(matches!(extractor.extract(&payload()).await, Err(ExtractionError::Parse(_))));
    }
}
