//! JSON routes for the page script and for scripted use.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use scriptscan_core::{ExtractionError, ImageCell, PrescriptionRecord};
use scriptscan_media::ImageUpload;

use crate::analysis;
use crate::server::GatewayState;
use crate::session::{SessionError, SessionSnapshot};

/// Optional header naming the uploaded file for `POST /api/analyze`.
pub const FILE_NAME_HEADER: &str = "x-file-name";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesResponse {
    pub generation: u64,
    pub images: Vec<ImageCell>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub session_id: Uuid,
    pub record: PrescriptionRecord,
}

/// `GET /api/session`
pub async fn session(State(state): State<GatewayState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

/// `GET /api/images`
pub async fn images(State(state): State<GatewayState>) -> Json<ImagesResponse> {
    let (generation, images) = state.session.images().await;
    Json(ImagesResponse { generation, images })
}

/// `POST /api/analyze`
///
/// The raw body is the image; `Content-Type` is its declared MIME type. The
/// call waits for extraction; image cells keep resolving afterwards and can
/// be polled from `/api/images`.
pub async fn analyze(State(state): State<GatewayState>, headers: HeaderMap, body: Bytes) -> Response {
    let declared = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("upload");

    let upload = match ImageUpload::from_bytes(file_name, declared, body, &state.intake) {
        Ok(upload) => upload,
        Err(e) => return error_response(SessionError::from(e)),
    };
    let ticket = match state.session.select_and_begin(upload).await {
        Ok(ticket) => ticket,
        Err(e) => return error_response(e),
    };

    match analysis::complete_analysis(state.clone(), ticket).await {
        Ok(record) => Json(AnalyzeResponse {
            session_id: state.session.id(),
            record,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::NoImage | SessionError::Intake(_) => StatusCode::BAD_REQUEST,
        SessionError::Busy => StatusCode::CONFLICT,
        SessionError::Extraction(ExtractionError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        SessionError::Extraction(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
