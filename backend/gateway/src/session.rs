//! The one analysis session this process serves.
//!
//! All state lives in a single `SessionState` that is replaced wholesale on
//! select and reset. A generation counter tags every in-flight operation so
//! late results from an earlier image are dropped instead of applied.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use scriptscan_core::{ExtractionError, ImageCell, ImagePayload, PrescriptionRecord};
use scriptscan_logging::{AnalysisEvent, EventLogger};
use scriptscan_media::{ImageUpload, IntakeError};

#[derive(Debug, Error)]
pub enum SessionError {
    /// Analysis was triggered with nothing selected. Callers treat this as a no-op.
    #[error("Please select an image file first.")]
    NoImage,

    #[error("an analysis is already in progress")]
    Busy,

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub generation: u64,
    pub upload: Option<ImageUpload>,
    pub analyzing: bool,
    pub record: Option<PrescriptionRecord>,
    pub images: Vec<ImageCell>,
    pub error: Option<String>,
    /// An extraction request is outstanding. Unlike `analyzing` this survives
    /// reset, because the request itself cannot be recalled.
    pub in_flight: bool,
}

impl SessionState {
    fn fresh(generation: u64, in_flight: bool) -> Self {
        Self {
            generation,
            in_flight,
            ..Default::default()
        }
    }

    /// Nothing selected, nothing shown.
    pub fn is_pristine(&self) -> bool {
        self.upload.is_none()
            && !self.analyzing
            && self.record.is_none()
            && self.images.is_empty()
            && self.error.is_none()
    }
}

/// What an analysis needs to run outside the lock.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub payload: ImagePayload,
}

/// Serializable view of the session for `/api/session`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub generation: u64,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: Option<usize>,
    pub analyzing: bool,
    pub record: Option<PrescriptionRecord>,
    pub images: Vec<ImageCell>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct Session {
    id: Uuid,
    state: Arc<RwLock<SessionState>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Make `upload` the current image, discarding any previous result.
    ///
    /// Refused with `Busy` while an extraction is outstanding.
    pub async fn select(&self, upload: ImageUpload) -> Result<(), SessionError> {
        let mut w = self.state.write().await;
        Self::replace_upload(self.id, &mut w, upload)
    }

    /// Select `upload` and begin analyzing it under one lock.
    pub async fn select_and_begin(&self, upload: ImageUpload) -> Result<AnalysisTicket, SessionError> {
        let mut w = self.state.write().await;
        Self::replace_upload(self.id, &mut w, upload)?;
        Self::begin(&mut w)
    }

    fn replace_upload(id: Uuid, w: &mut SessionState, upload: ImageUpload) -> Result<(), SessionError> {
        if w.in_flight {
            return Err(SessionError::Busy);
        }
        EventLogger::log_event(
            id,
            AnalysisEvent::ImageSelected {
                file_name: upload.file_name.clone(),
                mime_type: upload.mime_type.clone(),
                size_bytes: upload.size(),
            },
        );
        *w = SessionState {
            upload: Some(upload),
            ..SessionState::fresh(w.generation + 1, false)
        };
        Ok(())
    }

    /// Back to the pre-upload state.
    pub async fn reset(&self) {
        {
            let mut w = self.state.write().await;
            let fresh = SessionState::fresh(w.generation + 1, w.in_flight);
            *w = fresh;
        }
        EventLogger::log_event(self.id, AnalysisEvent::SessionReset);
    }

    /// Show a message without touching the selected image.
    pub async fn set_error(&self, message: impl Into<String>) {
        self.state.write().await.error = Some(message.into());
    }

    /// Mark an analysis as outstanding and hand out the image to send.
    pub async fn begin_analysis(&self) -> Result<AnalysisTicket, SessionError> {
        let mut w = self.state.write().await;
        Self::begin(&mut w)
    }

    fn begin(w: &mut SessionState) -> Result<AnalysisTicket, SessionError> {
        let payload = match &w.upload {
            Some(upload) => upload.payload(),
            None => return Err(SessionError::NoImage),
        };
        if w.in_flight {
            return Err(SessionError::Busy);
        }
        w.in_flight = true;
        w.analyzing = true;
        w.error = None;
        Ok(AnalysisTicket {
            generation: w.generation,
            payload,
        })
    }

    /// Apply an extraction outcome if the ticket is still current.
    ///
    /// Returns the generation that image lookups for this record must carry,
    /// or `None` when the result was stale and dropped. A failure keeps the
    /// selected image and any earlier record.
    pub async fn finish_analysis(
        &self,
        ticket: &AnalysisTicket,
        result: &Result<PrescriptionRecord, ExtractionError>,
    ) -> Option<u64> {
        let mut w = self.state.write().await;
        w.in_flight = false;
        if w.generation != ticket.generation {
            debug!(ticket = ticket.generation, current = w.generation, "Dropping stale analysis result");
            return None;
        }
        w.analyzing = false;
        match result {
            Ok(record) => {
                w.generation += 1;
                w.images = if record.is_prescription {
                    vec![ImageCell::Loading; record.medications.len()]
                } else {
                    Vec::new()
                };
                w.record = Some(record.clone());
                w.error = None;
            }
            Err(e) => w.error = Some(e.to_string()),
        }
        Some(w.generation)
    }

    /// Settle one medication's image cell. Each cell settles at most once.
    pub async fn settle_image(&self, generation: u64, index: usize, cell: ImageCell) -> bool {
        let mut w = self.state.write().await;
        if w.generation != generation {
            return false;
        }
        match w.images.get_mut(index) {
            Some(slot) if !slot.is_settled() => {
                *slot = cell;
                true
            }
            _ => false,
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn images(&self) -> (u64, Vec<ImageCell>) {
        let r = self.state.read().await;
        (r.generation, r.images.clone())
    }

    pub async fn upload(&self) -> Option<ImageUpload> {
        self.state.read().await.upload.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let r = self.state.read().await;
        SessionSnapshot {
            session_id: self.id,
            generation: r.generation,
            file_name: r.upload.as_ref().map(|u| u.file_name.clone()),
            mime_type: r.upload.as_ref().map(|u| u.mime_type.clone()),
            size_bytes: r.upload.as_ref().map(|u| u.size()),
            analyzing: r.analyzing,
            record: r.record.clone(),
            images: r.images.clone(),
            error: r.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptscan_core::Medication;
    use scriptscan_media::IntakePolicy;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    fn upload(name: &str) -> ImageUpload {
        ImageUpload::from_bytes(name, Some("image/png"), PNG.to_vec(), &IntakePolicy::default()).unwrap()
    }

    fn record(meds: usize) -> PrescriptionRecord {
        PrescriptionRecord {
            is_prescription: true,
            medications: (0..meds).map(|i| Medication::named(format!("Med {i}"))).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn begin_without_image_is_input_error() {
        let session = Session::new();
        assert!(matches!(session.begin_analysis().await, Err(SessionError::NoImage)));
        assert!(session.state().await.is_pristine());
    }

    #[tokio::test]
    async fn second_begin_is_busy() {
        let session = Session::new();
        session.select(upload("rx.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();
        assert_eq!(ticket.payload.mime_type, "image/png");
        assert!(matches!(session.begin_analysis().await, Err(SessionError::Busy)));
        assert!(session.state().await.analyzing);
    }

    #[tokio::test]
    async fn failure_keeps_upload_and_sets_message() {
        let session = Session::new();
        session.select(upload("rx.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();
        let applied = session
            .finish_analysis(&ticket, &Err(ExtractionError::Empty))
            .await;
        assert!(applied.is_some());

        let state = session.state().await;
        assert!(!state.analyzing);
        assert!(state.upload.is_some());
        assert!(state.record.is_none());
        assert_eq!(state.error.as_deref(), Some("no data returned"));

        // The user can retry without re-uploading.
        assert!(session.begin_analysis().await.is_ok());
        assert_eq!(session.state().await.error, None);
    }

    #[tokio::test]
    async fn success_starts_every_cell_loading() {
        let session = Session::new();
        session.select(upload("rx.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();
        let generation = session.finish_analysis(&ticket, &Ok(record(3))).await.unwrap();

        let (current, images) = session.images().await;
        assert_eq!(current, generation);
        assert_eq!(images, vec![ImageCell::Loading; 3]);
    }

    #[tokio::test]
    async fn rejected_record_has_no_cells() {
        let session = Session::new();
        session.select(upload("rx.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();
        let mut rejected = record(2);
        rejected.is_prescription = false;
        session.finish_analysis(&ticket, &Ok(rejected)).await;
        assert!(session.images().await.1.is_empty());
    }

    #[tokio::test]
    async fn cells_settle_once_and_independently() {
        let session = Session::new();
        session.select(upload("rx.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();
        let generation = session.finish_analysis(&ticket, &Ok(record(2))).await.unwrap();

        assert!(session.settle_image(generation, 1, ImageCell::NotFound).await);
        assert!(!session.settle_image(generation, 1, ImageCell::Found("x".into())).await);
        assert!(!session.settle_image(generation, 5, ImageCell::NotFound).await);

        let (_, images) = session.images().await;
        assert_eq!(images, vec![ImageCell::Loading, ImageCell::NotFound]);
    }

    #[tokio::test]
    async fn stale_results_are_dropped() {
        let session = Session::new();
        session.select(upload("first.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();

        session.reset().await;
        assert_eq!(session.finish_analysis(&ticket, &Ok(record(1))).await, None);

        let state = session.state().await;
        assert!(state.is_pristine());
        assert!(!state.in_flight);
        session.select(upload("second.png")).await.unwrap();
        assert_eq!(session.state().await.upload.unwrap().file_name, "second.png");
    }

    #[tokio::test]
    async fn new_image_is_refused_while_extraction_is_outstanding() {
        let session = Session::new();
        session.select(upload("first.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();

        assert!(matches!(session.select(upload("second.png")).await, Err(SessionError::Busy)));
        assert!(matches!(session.begin_analysis().await, Err(SessionError::Busy)));
        assert!(matches!(
            session.select_and_begin(upload("third.png")).await,
            Err(SessionError::Busy)
        ));
        assert_eq!(session.state().await.upload.unwrap().file_name, "first.png");

        session.finish_analysis(&ticket, &Ok(record(1))).await;
        assert!(session.select(upload("second.png")).await.is_ok());
    }

    #[tokio::test]
    async fn reset_does_not_release_an_outstanding_extraction() {
        let session = Session::new();
        session.select(upload("first.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();

        session.reset().await;
        assert!(session.state().await.is_pristine());
        assert!(matches!(session.select(upload("second.png")).await, Err(SessionError::Busy)));

        session.finish_analysis(&ticket, &Err(ExtractionError::Timeout)).await;
        let ticket = session.select_and_begin(upload("second.png")).await.unwrap();
        assert_eq!(ticket.generation, session.state().await.generation);
    }

    #[tokio::test]
    async fn lookups_after_reset_are_discarded() {
        let session = Session::new();
        session.select(upload("rx.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();
        let generation = session.finish_analysis(&ticket, &Ok(record(1))).await.unwrap();

        session.reset().await;
        assert!(!session.settle_image(generation, 0, ImageCell::NotFound).await);
        assert!(session.images().await.1.is_empty());
    }

    #[tokio::test]
    async fn reset_after_analysis_restores_pre_upload_state() {
        let session = Session::new();
        let before = session.snapshot().await;

        session.select(upload("rx.png")).await.unwrap();
        let ticket = session.begin_analysis().await.unwrap();
        session.finish_analysis(&ticket, &Ok(record(2))).await;
        session.set_error("late").await;
        session.reset().await;

        let after = session.snapshot().await;
        assert!(session.state().await.is_pristine());
        assert_eq!(
            SessionSnapshot {
                generation: before.generation,
                ..after.clone()
            },
            before
        );

        session.reset().await;
        assert!(session.state().await.is_pristine());
    }
}
