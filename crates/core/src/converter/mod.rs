//! Converter module for turning acquired media into output artifacts.
//!
//! Each converter implements the blocking [`Converter`] trait and is run on
//! the worker pool by the [`Dispatcher`](crate::dispatch::Dispatcher):
//!
//! - [`MidiConverter`]: audio to MIDI through a [`PitchEngine`]
//!   (default: the `basic-pitch` CLI)
//! - [`WavConverter`]: audio to 44.1 kHz / stereo / 16-bit WAV through an
//!   [`AudioCodec`] (default: ffmpeg)
//! - [`FrameConverter`]: first or last still frame of a video with ffmpeg
//!
//! # Example
//!
//! ```ignore
//! use mediaconv_core::converter::{FrameConverter, FrameOptions, FramePosition, Converter};
//!
//! let converter = FrameConverter::new(store, "ffmpeg");
//! let artifact = converter.convert(Path::new("uploads/in.mp4"), &FrameOptions::new(FramePosition::Last))?;
//! println!("Frame at {}", artifact.path.display());
//! ```

mod engine;
mod frame;
mod locator;
mod midi;
mod traits;
mod types;
mod wav;

pub use engine::{check_engine, run_engine, EngineOutput};
pub use frame::{build_frame_args, FrameConverter};
pub use locator::{OutputLocator, STEM_PLACEHOLDER};
pub use midi::{BasicPitchCli, MidiConverter};
pub use traits::{AudioCodec, Converter, PitchEngine};
pub use types::{
    FrameOptions, FramePosition, FrameRequest, ImageFormat, WavParams, DEFAULT_JPEG_QUALITY,
    JPEG_QUALITY_RANGE,
};
pub use wav::{FfmpegAudioCodec, WavConverter};

use crate::config::EngineConfig;
use crate::error::ConversionError;

/// Checks that every configured engine binary can be started.
///
/// Returns the engines that could not be found; the service still starts
/// without them and the affected conversions fail with `EngineNotFound`.
pub async fn check_engines(config: &EngineConfig) -> Vec<ConversionError> {
    let mut missing = Vec::new();

    if let Err(e) = check_engine("ffmpeg", &config.ffmpeg_path, "-version").await {
        missing.push(e);
    }
    if let Err(e) = check_engine("basic-pitch", &config.basic_pitch_path, "--help").await {
        missing.push(e);
    }

    missing
}
