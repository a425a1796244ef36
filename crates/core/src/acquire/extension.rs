//! Input extension inference for acquired media.

use std::path::Path;

/// Video container extensions accepted from a URL path or upload name.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "webm", "mkv", "avi"];

/// Extension used when nothing else identifies the container.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Extension every acquired audio input is stored under.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Returns the allow-listed video extension of a path or file name, if any.
pub fn video_extension_from_path(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().copied().find(|known| *known == ext)
}

/// Maps a declared `Content-Type` to a video extension.
pub fn video_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "video/x-matroska" => Some("mkv"),
        "video/x-msvideo" => Some("avi"),
        "video/x-m4v" => Some("m4v"),
        _ => None,
    }
}

/// Infers the extension for a video fetched from `url_path`.
///
/// The URL suffix wins when it is a known container; otherwise the
/// response content type decides, falling back to `mp4`.
pub fn infer_video_extension(url_path: &str, content_type: Option<&str>) -> &'static str {
    video_extension_from_path(url_path)
        .or_else(|| content_type.and_then(video_extension_from_content_type))
        .unwrap_or(DEFAULT_VIDEO_EXTENSION)
}

/// Case-insensitive check that `name` ends with `.ext`.
pub fn has_extension(name: &str, ext: &str) -> bool {
    name.to_ascii_lowercase()
        .ends_with(&format!(".{}", ext.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_wins_over_content_type() {
        for ext in VIDEO_EXTENSIONS {
            let path = format!("/media/clip.{}", ext);
            assert_eq!(infer_video_extension(&path, Some("video/webm")), *ext);
            assert_eq!(infer_video_extension(&path, Some("application/octet-stream")), *ext);
            assert_eq!(infer_video_extension(&path, None), *ext);
        }
    }

    #[test]
    fn test_suffix_is_case_insensitive() {
        assert_eq!(infer_video_extension("/clip.MOV", None), "mov");
        assert_eq!(infer_video_extension("/a/b/Clip.WebM", Some("video/mp4")), "webm");
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(infer_video_extension("/stream", Some("video/mp4")), "mp4");
        assert_eq!(infer_video_extension("/stream", Some("video/webm")), "webm");
        assert_eq!(infer_video_extension("/stream", Some("video/quicktime")), "mov");
        assert_eq!(infer_video_extension("/stream", Some("video/x-matroska")), "mkv");
        assert_eq!(
            infer_video_extension("/stream", Some("Video/WebM; codecs=\"vp9\"")),
            "webm"
        );
    }

    #[test]
    fn test_unknown_suffix_falls_back_to_content_type() {
        assert_eq!(infer_video_extension("/video.php", Some("video/quicktime")), "mov");
        assert_eq!(infer_video_extension("/video.flv", None), "mp4");
    }

    #[test]
    fn test_default_is_mp4() {
        assert_eq!(infer_video_extension("/", None), "mp4");
        assert_eq!(infer_video_extension("/watch", Some("text/html")), "mp4");
        assert_eq!(infer_video_extension("/watch", Some("")), "mp4");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("song.mp3", "mp3"));
        assert!(has_extension("SONG.MP3", "mp3"));
        assert!(has_extension("dir/song.Mp3", "mp3"));
        assert!(!has_extension("song.wav", "mp3"));
        assert!(!has_extension("mp3", "mp3"));
        assert!(!has_extension("song.mp3.txt", "mp3"));
        assert!(!has_extension("", "mp3"));
        // A bare extension still ends with it
        assert!(has_extension(".mp3", "mp3"));
        assert!(has_extension(".MP3", "mp3"));
    }
}
