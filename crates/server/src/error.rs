//! Mapping of conversion failures onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use mediaconv_core::{ConversionError, ErrorBody, ErrorKind};

/// Error returned by every conversion handler.
#[derive(Debug)]
pub enum ApiError {
    Conversion(ConversionError),
    /// The multipart body could not be read (malformed or over the size limit).
    Multipart(MultipartError),
}

impl From<ConversionError> for ApiError {
    fn from(error: ConversionError) -> Self {
        Self::Conversion(error)
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::Multipart(error)
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::DownloadFailed => StatusCode::BAD_REQUEST,
        ErrorKind::EngineNotFound => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::ConversionIncomplete | ErrorKind::ConversionFailed | ErrorKind::Io => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Conversion(e) => (status_for(e.kind()), ErrorBody::from(&e)),
            Self::Multipart(e) => (
                e.status(),
                ErrorBody {
                    success: false,
                    error_kind: ErrorKind::InvalidInput,
                    message: format!("Invalid multipart body: {}", e.body_text()),
                },
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error_kind = body.error_kind.as_str(), message = %body.message, "Request failed");
        } else {
            warn!(status = status.as_u16(), error_kind = body.error_kind.as_str(), message = %body.message, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}
