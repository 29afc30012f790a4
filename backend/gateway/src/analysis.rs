//! One analysis run: extraction, then one background lookup per medication.

use std::time::Instant;

use tracing::{debug, info, warn};

use scriptscan_core::{ImageCell, Medication, PrescriptionRecord};
use scriptscan_logging::{AnalysisEvent, EventLogger};

use crate::server::GatewayState;
use crate::session::{AnalysisTicket, SessionError};

/// Begin and run an analysis to completion.
pub async fn analyze(state: &GatewayState) -> Result<PrescriptionRecord, SessionError> {
    let ticket = state.session.begin_analysis().await?;
    complete_analysis(state.clone(), ticket).await
}

/// Run the extraction for an already-begun ticket and apply its result.
///
/// Image lookups are spawned before returning; they settle their cells on
/// their own schedule.
pub async fn complete_analysis(
    state: GatewayState,
    ticket: AnalysisTicket,
) -> Result<PrescriptionRecord, SessionError> {
    let session_id = state.session.id();
    EventLogger::log_event(
        session_id,
        AnalysisEvent::ExtractionStarted {
            provider: state.extractor.name().to_string(),
        },
    );

    let started = Instant::now();
    let result = state.extractor.extract(&ticket.payload).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(record) => {
            info!(
                is_prescription = record.is_prescription,
                medications = record.medication_count(),
                latency_ms,
                "Extraction finished"
            );
            EventLogger::log_event(
                session_id,
                AnalysisEvent::ExtractionSucceeded {
                    is_prescription: record.is_prescription,
                    medications: record.medication_count(),
                    latency_ms,
                },
            );
        }
        Err(e) => {
            warn!(error = %e, latency_ms, "Extraction failed");
            EventLogger::log_event(session_id, AnalysisEvent::ExtractionFailed { error_msg: e.to_string() });
        }
    }

    match state.session.finish_analysis(&ticket, &result).await {
        Some(generation) => {
            if let Ok(record) = &result {
                if record.is_prescription {
                    spawn_image_lookups(&state, generation, &record.medications);
                }
            }
        }
        None => debug!("Analysis result arrived after the session moved on"),
    }

    result.map_err(SessionError::from)
}

/// One task per medication. Each writes only its own cell.
fn spawn_image_lookups(state: &GatewayState, generation: u64, medications: &[Medication]) {
    for (index, medication) in medications.iter().cloned().enumerate() {
        let session = state.session.clone();
        let resolver = state.resolver.clone();
        tokio::spawn(async move {
            let result = resolver.resolve_medication(&medication).await;
            EventLogger::log_event(
                session.id(),
                AnalysisEvent::ImageLookup {
                    medication: medication.name.clone(),
                    found: result.url().is_some(),
                },
            );
            if !session.settle_image(generation, index, ImageCell::from(result)).await {
                debug!(index, medication = %medication.name, "Discarded image lookup for a previous result");
            }
        });
    }
}
