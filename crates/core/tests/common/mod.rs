//! Shared helpers for core integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;

use mediaconv_core::testing::{fake_service, FakeAudioCodec, FakeFrameConverter, FakePitchEngine};
use mediaconv_core::{ArtifactRole, Config, ConversionService, TransientStore};

/// Bytes served as an "MP3". The fakes never decode them.
pub const MP3_BYTES: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00fake-mp3-payload";

/// Service wired to fake engines over a temporary store.
pub struct TestHarness {
    pub service: ConversionService,
    pub store: TransientStore,
    pub pitch: Arc<FakePitchEngine>,
    pub codec: Arc<FakeAudioCodec>,
    pub frames: Arc<FakeFrameConverter>,
    pub temp_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.storage.root = temp_dir.path().to_path_buf();
        customize(&mut config);

        let store = TransientStore::new(&config.storage.root);
        let pitch = Arc::new(FakePitchEngine::new());
        let codec = Arc::new(FakeAudioCodec::new());
        let frames = Arc::new(FakeFrameConverter::new(store.clone()));
        let service = fake_service(&config, pitch.clone(), codec.clone(), frames.clone())
            .expect("Failed to build service");

        Self {
            service,
            store,
            pitch,
            codec,
            frames,
            temp_dir,
        }
    }

    /// Files currently present for a role.
    pub fn files(&self, role: ArtifactRole) -> Vec<std::path::PathBuf> {
        self.store.list_role(role).expect("Failed to list role dir")
    }

    /// Asserts nothing from any request is left in the store.
    pub fn assert_store_empty(&self) {
        for role in ArtifactRole::ALL {
            assert!(
                self.files(role).is_empty(),
                "expected no {} files, found {:?}",
                role.dir_name(),
                self.files(role)
            );
        }
    }
}

/// Starts a local HTTP server with canned media routes and returns its base URL.
pub async fn spawn_media_server() -> String {
    let app = Router::new()
        .route(
            "/song.mp3",
            get(|| async { ([(CONTENT_TYPE, "audio/mpeg")], MP3_BYTES) }),
        )
        .route(
            "/stream",
            get(|| async { ([(CONTENT_TYPE, "video/webm")], vec![0u8; 64]) }),
        )
        .route(
            "/clip.MOV",
            get(|| async { ([(CONTENT_TYPE, "video/webm")], vec![0u8; 64]) }),
        )
        .route(
            "/watch",
            get(|| async { ([(CONTENT_TYPE, "text/html")], vec![0u8; 64]) }),
        )
        .route("/missing.mp3", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/slow.mp3",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                MP3_BYTES
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind media server");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}
