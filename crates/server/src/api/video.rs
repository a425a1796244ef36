//! Still frame endpoints.
//!
//! The frame is transferred in the response body and removed from the
//! store once the transfer ends.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Response,
};
use std::sync::Arc;

use mediaconv_core::{FramePosition, FrameRequest, MediaSource};

use super::form::ConversionForm;
use super::payload::{frame_request, parse_object, url_field};
use super::transfer::file_response;
use crate::error::ApiError;
use crate::state::AppState;

async fn extract(
    state: &AppState,
    source: MediaSource,
    request: FrameRequest,
    position: FramePosition,
) -> Result<Response, ApiError> {
    let options = request.into_options(position);
    let media_type = options.format.media_type();

    let service = state.service();
    let artifact = service.extract_frame(source, options).await?;
    Ok(file_response(service.store(), artifact, media_type).await?)
}

async fn extract_json(
    state: &AppState,
    body: &[u8],
    position: FramePosition,
) -> Result<Response, ApiError> {
    let map = parse_object(body);
    let source = MediaSource::from_parts(None, url_field(&map))?;
    extract(state, source, frame_request(&map), position).await
}

async fn extract_form(
    state: &AppState,
    multipart: Multipart,
    position: FramePosition,
) -> Result<Response, ApiError> {
    let (source, request) = ConversionForm::read(multipart).await?.into_parts()?;
    extract(state, source, request, position).await
}

pub async fn first_frame_json(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    extract_json(&state, &body, FramePosition::First).await
}

pub async fn last_frame_json(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    extract_json(&state, &body, FramePosition::Last).await
}

pub async fn first_frame(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    extract_form(&state, multipart, FramePosition::First).await
}

pub async fn last_frame(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    extract_form(&state, multipart, FramePosition::Last).await
}
