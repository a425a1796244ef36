//! Fake still-frame converter.

use std::path::Path;
use std::sync::Mutex;

use super::lock;
use crate::converter::{Converter, FrameOptions, ImageFormat};
use crate::error::ConversionError;
use crate::store::{ArtifactRole, MediaArtifact, TransientStore};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = b"\xff\xd8\xff\xe0";

/// Writes a file carrying only the image signature of the requested format.
#[derive(Debug)]
pub struct FakeFrameConverter {
    store: TransientStore,
    next_error: Mutex<Option<ConversionError>>,
    calls: Mutex<Vec<FrameOptions>>,
}

impl FakeFrameConverter {
    pub fn new(store: TransientStore) -> Self {
        Self {
            store,
            next_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_next_error(&self, error: ConversionError) {
        *lock(&self.next_error) = Some(error);
    }

    /// Options of every call so far.
    pub fn calls(&self) -> Vec<FrameOptions> {
        lock(&self.calls).clone()
    }
}

impl Converter for FakeFrameConverter {
    type Options = FrameOptions;

    fn name(&self) -> &'static str {
        "frame"
    }

    fn convert(
        &self,
        _input: &Path,
        options: &FrameOptions,
    ) -> Result<MediaArtifact, ConversionError> {
        lock(&self.calls).push(options.clone());

        if let Some(err) = lock(&self.next_error).take() {
            return Err(err);
        }

        let artifact = self
            .store
            .allocate_blocking(ArtifactRole::Frame, options.format.extension())?;
        let bytes = match options.format {
            ImageFormat::Png => PNG_SIGNATURE,
            ImageFormat::Jpg => JPEG_SIGNATURE,
        };
        std::fs::write(&artifact.path, bytes)?;
        Ok(artifact)
    }
}
