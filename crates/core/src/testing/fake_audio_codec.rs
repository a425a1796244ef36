//! Fake audio codec writing silent WAV files.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::lock;
use crate::converter::{AudioCodec, WavParams};
use crate::error::ConversionError;

/// Fake implementation of [`AudioCodec`].
///
/// Ignores the input content and writes one second of silence in the
/// requested layout.
#[derive(Debug, Default)]
pub struct FakeAudioCodec {
    next_error: Mutex<Option<ConversionError>>,
    write_partial_on_error: Mutex<bool>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeAudioCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next encode to fail with the given error.
    pub fn set_next_error(&self, error: ConversionError) {
        *lock(&self.next_error) = Some(error);
    }

    /// When failing, leave a truncated file at the output path first.
    pub fn set_write_partial_on_error(&self, enabled: bool) {
        *lock(&self.write_partial_on_error) = enabled;
    }

    /// `(input, output)` pairs seen so far.
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        lock(&self.calls).clone()
    }
}

impl AudioCodec for FakeAudioCodec {
    fn name(&self) -> &str {
        "fake-codec"
    }

    fn encode_wav(
        &self,
        input: &Path,
        output: &Path,
        params: &WavParams,
    ) -> Result<Option<String>, ConversionError> {
        lock(&self.calls).push((input.to_path_buf(), output.to_path_buf()));

        if let Some(err) = lock(&self.next_error).take() {
            if *lock(&self.write_partial_on_error) {
                std::fs::write(output, b"RIFF")?;
            }
            return Err(err);
        }

        let spec = hound::WavSpec {
            channels: params.channels,
            sample_rate: params.sample_rate_hz,
            bits_per_sample: params.bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(output, spec)
            .map_err(|e| ConversionError::conversion_failed(e.to_string(), None))?;
        let samples = params.sample_rate_hz * u32::from(params.channels);
        for _ in 0..samples {
            writer
                .write_sample(0i16)
                .map_err(|e| ConversionError::conversion_failed(e.to_string(), None))?;
        }
        writer
            .finalize()
            .map_err(|e| ConversionError::conversion_failed(e.to_string(), None))?;

        Ok(None)
    }
}
