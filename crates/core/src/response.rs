//! Response payloads and download link construction.

use serde::{Deserialize, Serialize};

use crate::config::LinkConfig;
use crate::error::{ConversionError, ErrorKind};
use crate::store::MediaArtifact;

/// Success payload for URL-mode conversions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub message: String,
    pub download_url: String,
    pub filename: String,
}

impl ConvertResponse {
    pub fn for_artifact(host: &str, links: &LinkConfig, artifact: &MediaArtifact) -> Self {
        Self {
            success: true,
            message: "Conversion succeeded".to_string(),
            download_url: build_download_url(host, links, artifact),
            filename: artifact.file_name(),
        }
    }
}

/// Uniform failure payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&ConversionError> for ErrorBody {
    fn from(error: &ConversionError) -> Self {
        Self {
            success: false,
            error_kind: error.kind(),
            message: error.detailed_message(),
        }
    }
}

/// Builds the public link for an artifact left in the store.
///
/// Hosts listed in `https_hosts` (matched ignoring case and port) get a
/// canonical `https://<host>` base; every other host is linked over plain
/// HTTP exactly as the client addressed it.
pub fn build_download_url(host: &str, links: &LinkConfig, artifact: &MediaArtifact) -> String {
    let host = host.trim();
    let bare_host = host.split(':').next().unwrap_or(host);

    let base = match links
        .https_hosts
        .iter()
        .find(|h| h.eq_ignore_ascii_case(bare_host))
    {
        Some(canonical) => format!("https://{}", canonical),
        None => format!("http://{}", host),
    };

    format!(
        "{}{}/{}",
        base,
        links.path_prefix.trim_end_matches('/'),
        artifact.relative_location()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ArtifactKind, ArtifactRole};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn midi_artifact() -> MediaArtifact {
        let id = Uuid::new_v4();
        MediaArtifact {
            id,
            kind: ArtifactKind::ConversionOutput,
            role: ArtifactRole::Midi,
            path: PathBuf::from(format!("midis/{}.mid", id)),
            extension: "mid".to_string(),
        }
    }

    #[test]
    fn test_production_host_is_https() {
        let artifact = midi_artifact();
        let url = build_download_url("accentoracle.online", &LinkConfig::default(), &artifact);
        assert_eq!(
            url,
            format!("https://accentoracle.online/mp3-converter/midis/{}.mid", artifact.id)
        );

        let url = build_download_url("Accentoracle.Online:443", &LinkConfig::default(), &artifact);
        assert!(url.starts_with("https://accentoracle.online/mp3-converter/"));
    }

    #[test]
    fn test_other_hosts_are_http() {
        let artifact = midi_artifact();
        let url = build_download_url("localhost:8000", &LinkConfig::default(), &artifact);
        assert_eq!(
            url,
            format!("http://localhost:8000/mp3-converter/midis/{}.mid", artifact.id)
        );

        let url = build_download_url("10.0.0.5", &LinkConfig::default(), &artifact);
        assert!(url.starts_with("http://10.0.0.5/mp3-converter/midis/"));
    }

    #[test]
    fn test_custom_prefix() {
        let artifact = midi_artifact();
        let links = LinkConfig {
            path_prefix: "/".to_string(),
            https_hosts: vec![],
        };
        let url = build_download_url("example.com", &links, &artifact);
        assert_eq!(url, format!("http://example.com/midis/{}.mid", artifact.id));

        let links = LinkConfig {
            path_prefix: String::new(),
            https_hosts: vec!["example.com".to_string()],
        };
        let url = build_download_url("example.com", &links, &artifact);
        assert_eq!(url, format!("https://example.com/midis/{}.mid", artifact.id));
    }

    #[test]
    fn test_convert_response_fields() {
        let artifact = midi_artifact();
        let response = ConvertResponse::for_artifact("localhost", &LinkConfig::default(), &artifact);
        assert!(response.success);
        assert_eq!(response.filename, format!("{}.mid", artifact.id));
        assert!(response.download_url.ends_with(&response.filename));
    }

    #[test]
    fn test_error_body_includes_stderr() {
        let error = ConversionError::conversion_failed(
            "ffmpeg exited with code: Some(1)",
            Some("  Invalid data found when processing input\n".to_string()),
        );
        let body = ErrorBody::from(&error);
        assert!(!body.success);
        assert_eq!(body.error_kind, ErrorKind::ConversionFailed);
        assert!(body.message.ends_with("Invalid data found when processing input"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error_kind"], "conversion_failed");
        assert_eq!(json["success"], false);
    }
}
