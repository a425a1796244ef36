//! Multipart request bodies.

use axum::extract::Multipart;
use tracing::debug;

use mediaconv_core::{FrameRequest, MediaSource, UploadedFile};

use crate::error::ApiError;

/// Fields collected from a conversion form.
#[derive(Debug, Default)]
pub struct ConversionForm {
    pub file: Option<UploadedFile>,
    pub url: Option<String>,
    pub frame: FrameRequest,
}

impl ConversionForm {
    /// Reads every field of the body. Unknown fields are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let declared_name = field
                        .file_name()
                        .map(str::to_string)
                        .filter(|n| !n.is_empty());
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked
                    if declared_name.is_none() && bytes.is_empty() {
                        continue;
                    }
                    form.file = Some(UploadedFile::new(declared_name, bytes));
                }
                "url" => form.url = non_empty(field.text().await?),
                "width" => form.frame.width = integer(field.text().await?),
                "height" => form.frame.height = integer(field.text().await?),
                "format" => form.frame.format = non_empty(field.text().await?),
                "quality" => form.frame.quality = integer(field.text().await?),
                "sws_flags" => form.frame.sws_flags = non_empty(field.text().await?),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Splits the form into the media source and the frame parameters.
    pub fn into_parts(self) -> Result<(MediaSource, FrameRequest), ApiError> {
        let source = MediaSource::from_parts(self.file, self.url)?;
        Ok((source, self.frame))
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn integer(value: String) -> Option<i64> {
    value.trim().parse().ok()
}
