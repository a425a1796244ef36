//! Acquisition of input media from uploads or remote URLs.
//!
//! Both entry points produce a [`MediaArtifact`] of kind `upload_input` in
//! the store's `uploads` directory. Whatever either entry point wrote is
//! removed again before an error is returned.

mod extension;
mod source;

pub use extension::{
    has_extension, infer_video_extension, video_extension_from_content_type,
    video_extension_from_path, AUDIO_EXTENSION, DEFAULT_VIDEO_EXTENSION, VIDEO_EXTENSIONS,
};
pub use source::{MediaKind, MediaSource, UploadedFile};

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::DownloadConfig;
use crate::error::ConversionError;
use crate::metrics::{ACQUISITIONS_TOTAL, DOWNLOAD_DURATION};
use crate::store::{ArtifactRole, MediaArtifact, TransientStore};

/// Writes request inputs into the transient store.
#[derive(Debug, Clone)]
pub struct Acquirer {
    store: TransientStore,
    client: reqwest::Client,
}

impl Acquirer {
    /// Creates an acquirer whose HTTP client honors the download timeouts.
    pub fn new(store: TransientStore, config: &DownloadConfig) -> Result<Self, ConversionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| {
                ConversionError::download_failed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { store, client })
    }

    pub fn store(&self) -> &TransientStore {
        &self.store
    }

    /// Materializes `source` as an input artifact.
    pub async fn acquire(
        &self,
        source: MediaSource,
        kind: MediaKind,
    ) -> Result<MediaArtifact, ConversionError> {
        let label = source.label();
        let result = match source {
            MediaSource::Upload(upload) => self.from_upload(upload, kind).await,
            MediaSource::RemoteUrl(url) => self.from_url(&url, kind).await,
        };

        let outcome = if result.is_ok() { "ok" } else { "failed" };
        ACQUISITIONS_TOTAL.with_label_values(&[label, outcome]).inc();
        result
    }

    /// Stores an uploaded file.
    ///
    /// Audio uploads must be named `*.mp3` (any case). Video uploads are not
    /// checked; they keep an allow-listed extension or default to `mp4`.
    pub async fn from_upload(
        &self,
        upload: UploadedFile,
        kind: MediaKind,
    ) -> Result<MediaArtifact, ConversionError> {
        let declared = upload.declared_name.as_deref().unwrap_or("");
        let extension = match kind {
            MediaKind::Audio => {
                if !has_extension(declared, AUDIO_EXTENSION) {
                    return Err(ConversionError::invalid_input("Only MP3 files are supported"));
                }
                AUDIO_EXTENSION
            }
            MediaKind::Video => {
                video_extension_from_path(declared).unwrap_or(DEFAULT_VIDEO_EXTENSION)
            }
        };

        let artifact = self.store.allocate(ArtifactRole::Upload, extension).await?;
        if let Err(e) = tokio::fs::write(&artifact.path, &upload.bytes).await {
            self.store.delete(&artifact.path).await;
            return Err(e.into());
        }

        debug!(
            path = %artifact.path.display(),
            declared_name = declared,
            size_bytes = upload.bytes.len(),
            "Stored uploaded input"
        );
        Ok(artifact)
    }

    /// Downloads `url` into the store, streaming the body chunk by chunk.
    pub async fn from_url(
        &self,
        url: &str,
        kind: MediaKind,
    ) -> Result<MediaArtifact, ConversionError> {
        let parsed = Url::parse(url).map_err(|e| {
            ConversionError::download_failed(format!("Invalid URL '{}': {}", url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConversionError::download_failed(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        info!(url = %parsed, ?kind, "Downloading input");
        let start = Instant::now();

        let result = self.download(&parsed, kind).await;

        let outcome = if result.is_ok() { "ok" } else { "failed" };
        DOWNLOAD_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        if let Err(ref e) = result {
            warn!(url = %parsed, error = %e, "Download failed");
        }
        result
    }

    async fn download(&self, url: &Url, kind: MediaKind) -> Result<MediaArtifact, ConversionError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ConversionError::download_failed(format!("Failed to fetch URL: {}", e)))?;

        let response = response.error_for_status().map_err(|e| {
            ConversionError::download_failed(format!("Remote server returned an error: {}", e))
        })?;

        let extension = match kind {
            MediaKind::Audio => AUDIO_EXTENSION,
            MediaKind::Video => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok());
                infer_video_extension(url.path(), content_type)
            }
        };

        let artifact = self.store.allocate(ArtifactRole::Upload, extension).await?;

        match write_body(&artifact.path, response).await {
            Ok(size_bytes) => {
                debug!(
                    path = %artifact.path.display(),
                    size_bytes,
                    "Downloaded input"
                );
                Ok(artifact)
            }
            Err(e) => {
                self.store.delete(&artifact.path).await;
                Err(e)
            }
        }
    }
}

async fn write_body(path: &Path, response: reqwest::Response) -> Result<u64, ConversionError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            ConversionError::download_failed(format!("Failed while reading response body: {}", e))
        })?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn acquirer(temp: &TempDir) -> Acquirer {
        Acquirer::new(TransientStore::new(temp.path()), &DownloadConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_audio_upload_requires_mp3_name() {
        let temp = TempDir::new().unwrap();
        let acquirer = acquirer(&temp);

        let upload = UploadedFile::new(Some("notes.wav".to_string()), vec![0u8; 16]);
        let err = acquirer
            .from_upload(upload, MediaKind::Audio)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        // Rejected before anything was written
        assert!(acquirer.store().list_role(ArtifactRole::Upload).unwrap().is_empty());

        let upload = UploadedFile::new(None, vec![0u8; 16]);
        assert!(acquirer.from_upload(upload, MediaKind::Audio).await.is_err());
    }

    #[tokio::test]
    async fn test_audio_upload_is_stored_as_mp3() {
        let temp = TempDir::new().unwrap();
        let acquirer = acquirer(&temp);

        let upload = UploadedFile::new(Some("Track 01.MP3".to_string()), b"ID3data".to_vec());
        let artifact = acquirer
            .from_upload(upload, MediaKind::Audio)
            .await
            .unwrap();

        assert_eq!(artifact.extension, "mp3");
        assert_eq!(artifact.role, ArtifactRole::Upload);
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"ID3data");

        let upload = UploadedFile::new(Some(".mp3".to_string()), b"ID3data".to_vec());
        let artifact = acquirer
            .from_upload(upload, MediaKind::Audio)
            .await
            .unwrap();
        assert_eq!(artifact.extension, "mp3");
    }

    #[tokio::test]
    async fn test_video_upload_keeps_known_extension() {
        let temp = TempDir::new().unwrap();
        let acquirer = acquirer(&temp);

        let upload = UploadedFile::new(Some("clip.webm".to_string()), vec![1u8; 8]);
        let artifact = acquirer.from_upload(upload, MediaKind::Video).await.unwrap();
        assert_eq!(artifact.extension, "webm");

        let upload = UploadedFile::new(Some("clip.bin".to_string()), vec![1u8; 8]);
        let artifact = acquirer.from_upload(upload, MediaKind::Video).await.unwrap();
        assert_eq!(artifact.extension, "mp4");
    }

    #[tokio::test]
    async fn test_invalid_url_is_download_failed() {
        let temp = TempDir::new().unwrap();
        let acquirer = acquirer(&temp);

        let err = acquirer
            .from_url("not a url", MediaKind::Audio)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DownloadFailed);

        let err = acquirer
            .from_url("ftp://example.com/a.mp3", MediaKind::Audio)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DownloadFailed);
        assert!(acquirer.store().list_role(ArtifactRole::Upload).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_acquire_dispatches_on_source() {
        let temp = TempDir::new().unwrap();
        let acquirer = acquirer(&temp);

        let source = MediaSource::Upload(UploadedFile::new(
            Some("a.mp3".to_string()),
            b"abc".to_vec(),
        ));
        let artifact = acquirer.acquire(source, MediaKind::Audio).await.unwrap();
        assert!(artifact.path.exists());
    }
}
