//! Still-frame extraction from video with ffmpeg.

use std::path::{Path, PathBuf};
use tracing::info;

use super::engine::run_engine;
use super::traits::Converter;
use super::types::{FrameOptions, FramePosition, ImageFormat};
use crate::error::ConversionError;
use crate::store::{ArtifactRole, MediaArtifact, TransientStore};

/// Seek offset from the end of the input used for the last frame.
const LAST_FRAME_OFFSET: &str = "-0.1";

/// Builds the ffmpeg command line for a single still frame.
pub fn build_frame_args(input: &Path, output: &Path, options: &FrameOptions) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
    ];

    // Input seeking must come before -i
    match options.position {
        FramePosition::First => args.extend(["-ss".to_string(), "0".to_string()]),
        FramePosition::Last => {
            args.extend(["-sseof".to_string(), LAST_FRAME_OFFSET.to_string()])
        }
    }

    args.extend([
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
    ]);

    if options.is_scaled() {
        let width = options.width.map(|w| w.to_string()).unwrap_or_else(|| "-1".to_string());
        let height = options.height.map(|h| h.to_string()).unwrap_or_else(|| "-1".to_string());
        let mut filter = format!("scale={}:{}", width, height);
        if let Some(ref flags) = options.scale_flags {
            filter.push_str(&format!(":flags={}", flags));
        }
        args.extend(["-vf".to_string(), filter]);
    }

    match options.format {
        ImageFormat::Jpg => {
            args.extend(["-q:v".to_string(), options.jpeg_quality.to_string()]);
        }
        ImageFormat::Png => {
            args.extend([
                "-pix_fmt".to_string(),
                "rgb48be".to_string(),
                "-compression_level".to_string(),
                "0".to_string(),
            ]);
        }
    }

    args.push(output.to_string_lossy().to_string());
    args
}

/// Extracts the first or last frame of a video into the `frames` directory.
#[derive(Debug, Clone)]
pub struct FrameConverter {
    store: TransientStore,
    ffmpeg_path: PathBuf,
}

impl FrameConverter {
    pub fn new(store: TransientStore, ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

impl Converter for FrameConverter {
    type Options = FrameOptions;

    fn name(&self) -> &'static str {
        "frame"
    }

    fn convert(
        &self,
        input: &Path,
        options: &FrameOptions,
    ) -> Result<MediaArtifact, ConversionError> {
        let artifact = self
            .store
            .allocate_blocking(ArtifactRole::Frame, options.format.extension())?;
        let args = build_frame_args(input, &artifact.path, options);

        info!(
            position = options.position.as_str(),
            format = options.format.extension(),
            width = ?options.width,
            height = ?options.height,
            input = %input.display(),
            "Extracting still frame"
        );

        let output = match run_engine("ffmpeg", &self.ffmpeg_path, &args) {
            Ok(output) => output,
            Err(e) => {
                self.store.delete_blocking(&artifact.path);
                return Err(e);
            }
        };

        let stderr = output.stderr_text();
        if let Err(e) = output.check_status("ffmpeg") {
            self.store.delete_blocking(&artifact.path);
            return Err(e);
        }

        let written = std::fs::metadata(&artifact.path)
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            self.store.delete_blocking(&artifact.path);
            return Err(ConversionError::conversion_incomplete(
                format!(
                    "ffmpeg finished but produced no {} frame",
                    options.position.as_str()
                ),
                stderr,
            ));
        }

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::types::FrameRequest;

    fn args_for(request: FrameRequest, position: FramePosition) -> Vec<String> {
        build_frame_args(
            Path::new("/in/video.mp4"),
            Path::new("/out/frame.png"),
            &request.into_options(position),
        )
    }

    fn position_of(args: &[String], flag: &str) -> Option<usize> {
        args.iter().position(|a| a == flag)
    }

    #[test]
    fn test_first_frame_seeks_before_input() {
        let args = args_for(FrameRequest::default(), FramePosition::First);
        let ss = position_of(&args, "-ss").unwrap();
        let input = position_of(&args, "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "0");
        assert!(position_of(&args, "-sseof").is_none());
    }

    #[test]
    fn test_last_frame_seeks_from_end() {
        let args = args_for(FrameRequest::default(), FramePosition::Last);
        let sseof = position_of(&args, "-sseof").unwrap();
        assert!(sseof < position_of(&args, "-i").unwrap());
        assert_eq!(args[sseof + 1], "-0.1");
    }

    #[test]
    fn test_single_frame_and_overwrite() {
        let args = args_for(FrameRequest::default(), FramePosition::First);
        let frames = position_of(&args, "-frames:v").unwrap();
        assert_eq!(args[frames + 1], "1");
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/out/frame.png"));
    }

    #[test]
    fn test_png_is_lossless_16_bit() {
        let args = args_for(FrameRequest::default(), FramePosition::First);
        let joined = args.join(" ");
        assert!(joined.contains("-pix_fmt rgb48be"));
        assert!(joined.contains("-compression_level 0"));
        assert!(position_of(&args, "-q:v").is_none());
        assert!(position_of(&args, "-vf").is_none());
    }

    #[test]
    fn test_jpg_quality() {
        let request = FrameRequest {
            format: Some("jpg".to_string()),
            quality: Some(50),
            ..Default::default()
        };
        let args = args_for(request, FramePosition::First);
        let q = position_of(&args, "-q:v").unwrap();
        assert_eq!(args[q + 1], "2");
        assert!(position_of(&args, "-pix_fmt").is_none());

        let request = FrameRequest {
            format: Some("jpg".to_string()),
            quality: Some(7),
            ..Default::default()
        };
        let args = args_for(request, FramePosition::First);
        let q = position_of(&args, "-q:v").unwrap();
        assert_eq!(args[q + 1], "7");
    }

    #[test]
    fn test_scale_with_one_dimension() {
        let request = FrameRequest {
            width: Some(320),
            ..Default::default()
        };
        let args = args_for(request, FramePosition::First);
        let vf = position_of(&args, "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=320:-1");

        let request = FrameRequest {
            height: Some(240),
            ..Default::default()
        };
        let args = args_for(request, FramePosition::First);
        let vf = position_of(&args, "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=-1:240");
    }

    #[test]
    fn test_scale_flags_only_with_scaling() {
        let request = FrameRequest {
            width: Some(640),
            height: Some(360),
            sws_flags: Some("lanczos".to_string()),
            ..Default::default()
        };
        let args = args_for(request, FramePosition::First);
        let vf = position_of(&args, "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=640:360:flags=lanczos");

        let request = FrameRequest {
            sws_flags: Some("lanczos".to_string()),
            ..Default::default()
        };
        let args = args_for(request, FramePosition::First);
        assert!(position_of(&args, "-vf").is_none());
        assert!(!args.join(" ").contains("lanczos"));
    }

    #[test]
    fn test_missing_ffmpeg_leaves_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = TransientStore::new(temp.path());
        let converter = FrameConverter::new(store.clone(), "/nonexistent/ffmpeg");

        let err = converter
            .convert(
                Path::new("/in/video.mp4"),
                &FrameOptions::new(FramePosition::First),
            )
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::EngineNotFound);
        assert!(store.list_role(ArtifactRole::Frame).unwrap().is_empty());
    }
}
