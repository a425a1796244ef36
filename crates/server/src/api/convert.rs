//! Audio conversion endpoints.
//!
//! Results stay in the store and the client receives a download link.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, HeaderMap},
    Json,
};
use std::sync::Arc;

use mediaconv_core::{AudioTarget, ConvertResponse, MediaSource};

use super::form::ConversionForm;
use super::payload::{parse_object, url_field};
use crate::error::ApiError;
use crate::state::AppState;

const FALLBACK_HOST: &str = "localhost";

fn request_host(headers: &HeaderMap) -> &str {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or(FALLBACK_HOST)
}

async fn convert(
    state: &AppState,
    headers: &HeaderMap,
    source: MediaSource,
    target: AudioTarget,
) -> Result<Json<ConvertResponse>, ApiError> {
    let artifact = state.service().convert_audio(source, target).await?;
    Ok(Json(ConvertResponse::for_artifact(
        request_host(headers),
        state.links(),
        &artifact,
    )))
}

async fn convert_form(
    state: &AppState,
    headers: &HeaderMap,
    multipart: Multipart,
    target: AudioTarget,
) -> Result<Json<ConvertResponse>, ApiError> {
    let (source, _) = ConversionForm::read(multipart).await?.into_parts()?;
    convert(state, headers, source, target).await
}

async fn convert_json(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    target: AudioTarget,
) -> Result<Json<ConvertResponse>, ApiError> {
    let source = MediaSource::from_parts(None, url_field(&parse_object(body)))?;
    convert(state, headers, source, target).await
}

pub async fn to_midi(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    convert_form(&state, &headers, multipart, AudioTarget::Midi).await
}

pub async fn to_midi_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ConvertResponse>, ApiError> {
    convert_json(&state, &headers, &body, AudioTarget::Midi).await
}

pub async fn to_wav(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    convert_form(&state, &headers, multipart, AudioTarget::Wav).await
}

pub async fn to_wav_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ConvertResponse>, ApiError> {
    convert_json(&state, &headers, &body, AudioTarget::Wav).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_host() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_host(&headers), "localhost");

        headers.insert(header::HOST, HeaderValue::from_static("media.example:8000"));
        assert_eq!(request_host(&headers), "media.example:8000");
    }
}
