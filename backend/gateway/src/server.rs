//! HTTP server for the local app.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use scriptscan_core::PrescriptionExtractor;
use scriptscan_lookup::{DrugImageResolver, SearchLinkBuilder};
use scriptscan_media::IntakePolicy;

use crate::session::Session;
use crate::{api, health_api, ui};

/// Multipart framing on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared by every route.
#[derive(Clone)]
pub struct GatewayState {
    pub session: Session,
    pub extractor: Arc<dyn PrescriptionExtractor>,
    pub resolver: DrugImageResolver,
    pub links: SearchLinkBuilder,
    pub intake: IntakePolicy,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(
        extractor: Arc<dyn PrescriptionExtractor>,
        resolver: DrugImageResolver,
        links: SearchLinkBuilder,
        intake: IntakePolicy,
    ) -> Self {
        Self {
            session: Session::new(),
            extractor,
            resolver,
            links,
            intake,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    let body_limit = match state.intake.max_bytes {
        Some(max) => DefaultBodyLimit::max(max + FORM_OVERHEAD_BYTES),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(ui::index))
        .route("/upload", post(ui::upload))
        .route("/analyze", post(ui::analyze))
        .route("/reset", post(ui::reset))
        .route("/preview", get(ui::preview))
        .route("/api/session", get(api::session))
        .route("/api/images", get(api::images))
        .route("/api/analyze", post(api::analyze))
        .route("/api/health", get(health_api::get_health))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("ScriptScan listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
