//! Health API
//!
//! `GET /api/health`, used by `scriptscan status`.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub extractor: String,
    pub image_source: String,
    pub analyzing: bool,
    pub timestamp: DateTime<Utc>,
}

pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        service: "scriptscan".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        extractor: state.extractor.name().to_string(),
        image_source: state.resolver.source_name().to_string(),
        analyzing: state.session.state().await.analyzing,
        timestamp: Utc::now(),
    })
}
