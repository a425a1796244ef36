//! Trait definitions for the converter module.

use std::path::Path;

use super::types::WavParams;
use crate::error::ConversionError;
use crate::store::MediaArtifact;

/// A blocking conversion from one input file to one output artifact.
///
/// Implementations run on the blocking worker pool, never on the async
/// request path. A converter owns the cleanup of its own output: when
/// `convert` returns an error nothing it wrote may remain in the store.
pub trait Converter: Send + Sync {
    /// Per-call parameters.
    type Options: Send + 'static;

    /// Returns the name of this converter, used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Converts `input` into a new output artifact.
    fn convert(&self, input: &Path, options: &Self::Options)
        -> Result<MediaArtifact, ConversionError>;
}

/// Pitch-detection engine turning audio into MIDI.
///
/// The engine writes into `output_dir` under a name of its own choosing;
/// the caller discovers the result afterwards. On success the engine's
/// diagnostic output, if any, is returned for error reporting.
pub trait PitchEngine: Send + Sync {
    fn name(&self) -> &str;

    fn transcribe(&self, input: &Path, output_dir: &Path)
        -> Result<Option<String>, ConversionError>;
}

/// Audio codec decoding compressed audio into PCM WAV.
pub trait AudioCodec: Send + Sync {
    fn name(&self) -> &str;

    /// Writes `input` as a WAV file at exactly `output`, returning the
    /// codec's diagnostic output if it printed any.
    fn encode_wav(
        &self,
        input: &Path,
        output: &Path,
        params: &WavParams,
    ) -> Result<Option<String>, ConversionError>;
}
