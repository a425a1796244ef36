//! Service information endpoints.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use mediaconv_core::{Config, DispatcherStatus};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct Endpoints {
    pub convert_to_midi: &'static str,
    pub convert_to_wav: &'static str,
    pub video_first_frame: &'static str,
    pub video_last_frame: &'static str,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub endpoints: Endpoints,
}

/// Service banner listing the conversion endpoints.
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Media conversion service: MP3 to MIDI/WAV and video still frames",
        endpoints: Endpoints {
            convert_to_midi: "/convert",
            convert_to_wav: "/convert/wav",
            video_first_frame: "/convert/video/first-frame/json",
            video_last_frame: "/convert/video/last-frame/json",
        },
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub dispatcher: DispatcherStatus,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        dispatcher: state.service().dispatcher().status(),
    })
}

/// Effective configuration.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

/// Prometheus scrape endpoint.
pub async fn metrics() -> Response {
    match encode_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
