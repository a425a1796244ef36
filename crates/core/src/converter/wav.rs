//! Audio to WAV conversion through an audio codec.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::engine::run_engine;
use super::traits::{AudioCodec, Converter};
use super::types::WavParams;
use crate::error::ConversionError;
use crate::store::{ArtifactRole, MediaArtifact, TransientStore};

/// Decodes audio to PCM WAV with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegAudioCodec {
    ffmpeg_path: PathBuf,
}

impl FfmpegAudioCodec {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn build_args(input: &Path, output: &Path, params: &WavParams) -> Vec<String> {
        let (sample_fmt, codec) = params.ffmpeg_sample_format();
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-ar".to_string(),
            params.sample_rate_hz.to_string(),
            "-ac".to_string(),
            params.channels.to_string(),
            "-sample_fmt".to_string(),
            sample_fmt.to_string(),
            "-c:a".to_string(),
            codec.to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

impl AudioCodec for FfmpegAudioCodec {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode_wav(
        &self,
        input: &Path,
        output: &Path,
        params: &WavParams,
    ) -> Result<Option<String>, ConversionError> {
        let args = Self::build_args(input, output, params);
        let output = run_engine(self.name(), &self.ffmpeg_path, &args)?.check_status(self.name())?;
        Ok(output.stderr_text())
    }
}

/// Converts MP3 input into a `<uuid>.wav` artifact.
pub struct WavConverter {
    store: TransientStore,
    codec: Arc<dyn AudioCodec>,
    params: WavParams,
}

impl WavConverter {
    pub fn new(store: TransientStore, codec: Arc<dyn AudioCodec>) -> Self {
        Self {
            store,
            codec,
            params: WavParams::default(),
        }
    }

    pub fn params(&self) -> &WavParams {
        &self.params
    }
}

impl Converter for WavConverter {
    type Options = ();

    fn name(&self) -> &'static str {
        "wav"
    }

    fn convert(&self, input: &Path, _options: &()) -> Result<MediaArtifact, ConversionError> {
        let artifact = self.store.allocate_blocking(ArtifactRole::Wav, "wav")?;

        info!(
            codec = self.codec.name(),
            input = %input.display(),
            output = %artifact.path.display(),
            "Encoding WAV"
        );

        let diagnostics = match self.codec.encode_wav(input, &artifact.path, &self.params) {
            Ok(diagnostics) => diagnostics,
            Err(e) => {
                self.store.delete_blocking(&artifact.path);
                return Err(e);
            }
        };

        let written = std::fs::metadata(&artifact.path)
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            self.store.delete_blocking(&artifact.path);
            return Err(ConversionError::conversion_incomplete(
                format!("{} finished but produced no WAV data", self.codec.name()),
                diagnostics,
            ));
        }

        Ok(artifact)
    }
}
