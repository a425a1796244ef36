//! Request-level description of where an input comes from.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// Whether the input is audio (MP3) or video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

/// A file received in the request body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name declared by the client, if any.
    pub declared_name: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(declared_name: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            declared_name,
            bytes: bytes.into(),
        }
    }
}

/// The single input source of a conversion request.
#[derive(Debug, Clone)]
pub enum MediaSource {
    Upload(UploadedFile),
    RemoteUrl(String),
}

impl MediaSource {
    /// Builds a source from the optional request parts.
    ///
    /// Exactly one of `upload` and a non-blank `url` must be present. This
    /// check touches nothing on disk or on the network.
    pub fn from_parts(
        upload: Option<UploadedFile>,
        url: Option<String>,
    ) -> Result<Self, ConversionError> {
        let url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        match (upload, url) {
            (Some(upload), None) => Ok(Self::Upload(upload)),
            (None, Some(url)) => Ok(Self::RemoteUrl(url)),
            (None, None) => Err(ConversionError::invalid_input(
                "Provide either a file or a URL",
            )),
            (Some(_), Some(_)) => Err(ConversionError::invalid_input(
                "Provide only one of a file or a URL, not both",
            )),
        }
    }

    /// Metric/log label for the source type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::RemoteUrl(_) => "url",
        }
    }
}
