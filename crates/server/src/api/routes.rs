use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use mediaconv_core::ArtifactRole;

use super::middleware::metrics_middleware;
use super::{convert, handlers, video};
use crate::state::AppState;

/// Builds the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let store = state.service().store();
    let body_limit = state.config().server.max_upload_bytes;

    let conversions = Router::new()
        .route("/convert", post(convert::to_midi))
        .route("/convert/json", post(convert::to_midi_json))
        .route("/convert/wav", post(convert::to_wav))
        .route("/convert/wav/json", post(convert::to_wav_json))
        .route("/convert/video/first-frame", post(video::first_frame))
        .route("/convert/video/last-frame", post(video::last_frame))
        .route(
            "/convert/video/first-frame/json",
            post(video::first_frame_json),
        )
        .route(
            "/convert/video/last-frame/json",
            post(video::last_frame_json),
        )
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        .merge(conversions)
        .nest_service("/midis", ServeDir::new(store.role_dir(ArtifactRole::Midi)))
        .nest_service("/wavs", ServeDir::new(store.role_dir(ArtifactRole::Wav)))
        .nest_service("/frames", ServeDir::new(store.role_dir(ArtifactRole::Frame)))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
