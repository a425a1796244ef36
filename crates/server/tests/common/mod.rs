//! Test utilities for API integration tests.
//!
//! The router runs in-process over a temporary store with fake engines, so
//! no ffmpeg or basic-pitch binary is needed.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mediaconv_core::testing::{fake_service, FakeAudioCodec, FakeFrameConverter, FakePitchEngine};
use mediaconv_core::{ArtifactRole, Config, TransientStore};
use mediaconv_server::api::create_router;
use mediaconv_server::state::AppState;

pub const MP3_BYTES: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00fake-mp3-payload";
pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42fake-video";

const BOUNDARY: &str = "mediaconv-test-boundary";

pub struct TestFixture {
    pub router: Router,
    pub store: TransientStore,
    pub pitch: Arc<FakePitchEngine>,
    pub codec: Arc<FakeAudioCodec>,
    pub frames: Arc<FakeFrameConverter>,
    pub temp_dir: TempDir,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    /// Body parsed as JSON, `Null` when it is not JSON.
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

impl TestFixture {
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

        let router = create_router(Arc::new(AppState::new(config, service)));

        Self {
            router,
            store,
            pitch,
            codec,
            frames,
            temp_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Host", "localhost:8000")
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, &body.to_string(), "application/json")
            .await
    }

    pub async fn post_raw(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        self.post_bytes(path, body.as_bytes().to_vec(), content_type, "localhost:8000")
            .await
    }

    pub async fn post_multipart(&self, path: &str, form: MultipartForm) -> TestResponse {
        self.post_multipart_with_host(path, form, "localhost:8000")
            .await
    }

    pub async fn post_multipart_with_host(
        &self,
        path: &str,
        form: MultipartForm,
        host: &str,
    ) -> TestResponse {
        let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
        self.post_bytes(path, form.finish(), &content_type, host)
            .await
    }

    async fn post_bytes(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
        host: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Host", host)
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    pub fn files(&self, role: ArtifactRole) -> Vec<std::path::PathBuf> {
        self.store.list_role(role).expect("Failed to list role dir")
    }

    pub fn assert_no_inputs_left(&self) {
        assert!(self.files(ArtifactRole::Upload).is_empty());
    }

    /// Asserts nothing from any request is left in the store.
    ///
    /// Transferred frames are removed by a task spawned when the response
    /// body is dropped, so this waits briefly for the store to drain.
    pub async fn assert_store_empty(&self) {
        for _ in 0..100 {
            if ArtifactRole::ALL.iter().all(|role| self.files(*role).is_empty()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
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

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

/// Starts a local HTTP server serving canned media and returns its base URL.
pub async fn spawn_media_server() -> String {
    let app = Router::new()
        .route(
            "/song.mp3",
            get(|| async { ([(CONTENT_TYPE, "audio/mpeg")], MP3_BYTES) }),
        )
        .route(
            "/clip.mp4",
            get(|| async { ([(CONTENT_TYPE, "video/mp4")], VIDEO_BYTES) }),
        )
        .route("/missing.mp4", get(|| async { StatusCode::NOT_FOUND }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind media server");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}
