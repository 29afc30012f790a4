//! Browser-facing routes: the page itself and its form posts.

use axum::{
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use scriptscan_media::{ImageUpload, is_inline_safe};
use scriptscan_render::{PageModel, ResultView, render_page};

use crate::analysis::complete_analysis;
use crate::server::GatewayState;
use crate::session::SessionError;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// `GET /`
pub async fn index(State(state): State<GatewayState>) -> Html<String> {
    Html(render_page(&page_model(&state).await))
}

pub(crate) async fn page_model(state: &GatewayState) -> PageModel {
    let current = state.session.state().await;
    PageModel {
        file_name: current.upload.as_ref().map(|u| u.file_name.clone()),
        preview_url: current.upload.as_ref().map(|_| "/preview".to_string()),
        analyzing: current.analyzing,
        error: current.error.clone(),
        result: current
            .record
            .as_ref()
            .map(|record| ResultView::from_record(record, &current.images, &state.links)),
        provider: display_name(state.extractor.name()),
        max_upload_bytes: state.intake.max_bytes,
    }
}

fn display_name(provider: &str) -> String {
    let mut chars = provider.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `POST /upload`
pub async fn upload(State(state): State<GatewayState>, mut multipart: Multipart) -> Redirect {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Malformed upload");
                state.session.set_error(format!("error reading file: {e}")).await;
                break;
            }
        };
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("image").to_string();
        let declared = field.content_type().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to read upload body");
                state.session.set_error(format!("error reading file: {e}")).await;
                break;
            }
        };

        match ImageUpload::from_bytes(file_name, declared.as_deref(), data, &state.intake) {
            Ok(upload) => {
                if let Err(e) = state.session.select(upload).await {
                    debug!(error = %e, "Upload refused");
                    state.session.set_error(e.to_string()).await;
                }
            }
            Err(e) => {
                debug!(error = %e, "Rejected upload");
                state.session.set_error(e.to_string()).await;
            }
        }
        break;
    }
    Redirect::to("/")
}

/// `POST /analyze`
///
/// Starts the extraction in the background; the page refreshes while it runs.
pub async fn analyze(State(state): State<GatewayState>) -> Redirect {
    match state.session.begin_analysis().await {
        Ok(ticket) => {
            let background = state.clone();
            tokio::spawn(async move {
                // Failures are already recorded on the session.
                let _ = complete_analysis(background, ticket).await;
            });
        }
        Err(SessionError::NoImage) => debug!("Analyze requested with no image selected"),
        Err(e) => debug!(error = %e, "Analyze request ignored"),
    }
    Redirect::to("/")
}

/// `POST /reset`
pub async fn reset(State(state): State<GatewayState>) -> Redirect {
    state.session.reset().await;
    Redirect::to("/")
}

/// `GET /preview`
///
/// Types a browser would not render as a plain image (SVG among them) are
/// only offered as a download.
pub async fn preview(State(state): State<GatewayState>) -> Response {
    let Some(upload) = state.session.upload().await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let disposition = if is_inline_safe(&upload.mime_type) {
        "inline"
    } else {
        "attachment"
    };
    (
        [
            (header::CONTENT_TYPE, upload.mime_type),
            (header::CONTENT_DISPOSITION, disposition.to_string()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        upload.data,
    )
        .into_response()
}
