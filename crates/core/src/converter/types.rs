//! Types for the converter module.

use serde::{Deserialize, Serialize};

/// Fixed PCM layout for WAV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavParams {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for WavParams {
    /// CD quality: 44.1 kHz, stereo, 16-bit.
    fn default() -> Self {
        Self {
            sample_rate_hz: 44_100,
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

impl WavParams {
    /// Returns the ffmpeg `(sample_fmt, codec)` pair for the bit depth.
    pub fn ffmpeg_sample_format(&self) -> (&'static str, &'static str) {
        match self.bits_per_sample {
            8 => ("u8", "pcm_u8"),
            24 => ("s32", "pcm_s24le"),
            32 => ("s32", "pcm_s32le"),
            _ => ("s16", "pcm_s16le"),
        }
    }
}

/// Which frame of a video to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePosition {
    First,
    Last,
}

impl FramePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

/// Still-frame image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
}

impl ImageFormat {
    /// Parses a requested format. Anything other than `jpg` is PNG.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("jpg") {
            Self::Jpg
        } else {
            Self::Png
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }
}

/// Lowest (best) and highest ffmpeg `-q:v` value accepted for JPEG output.
pub const JPEG_QUALITY_RANGE: std::ops::RangeInclusive<i64> = 2..=31;

/// Quality used when none or an out-of-range value is requested.
pub const DEFAULT_JPEG_QUALITY: u8 = 2;

/// Frame extraction parameters as requested by a client, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRequest {
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<i64>,
    #[serde(default)]
    pub sws_flags: Option<String>,
}

impl FrameRequest {
    /// Normalizes the request into options the transcoder can run with.
    ///
    /// Non-positive dimensions are dropped, unknown formats become PNG, an
    /// out-of-range quality becomes 2 and scaling flags outside
    /// `[A-Za-z0-9_+]` are dropped.
    pub fn into_options(self, position: FramePosition) -> FrameOptions {
        let format = self
            .format
            .as_deref()
            .map(ImageFormat::parse)
            .unwrap_or_default();

        let jpeg_quality = self
            .quality
            .filter(|q| JPEG_QUALITY_RANGE.contains(q))
            .map(|q| q as u8)
            .unwrap_or(DEFAULT_JPEG_QUALITY);

        FrameOptions {
            position,
            width: positive_dimension(self.width),
            height: positive_dimension(self.height),
            format,
            jpeg_quality,
            scale_flags: self.sws_flags.filter(|f| is_valid_scale_flags(f)),
        }
    }
}

fn positive_dimension(value: Option<i64>) -> Option<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

fn is_valid_scale_flags(flags: &str) -> bool {
    !flags.is_empty()
        && flags
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '+')
}

/// Normalized frame extraction options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameOptions {
    pub position: FramePosition,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: ImageFormat,
    /// `-q:v` value; only used for JPEG.
    pub jpeg_quality: u8,
    /// ffmpeg scaler flags, only applied when scaling.
    pub scale_flags: Option<String>,
}

impl FrameOptions {
    /// Full-size PNG of the given frame.
    pub fn new(position: FramePosition) -> Self {
        FrameRequest::default().into_options(position)
    }

    /// Whether a scale filter is needed.
    pub fn is_scaled(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}
