//! Direct transfer of an artifact that is deleted once the body is done.

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::runtime::Handle;
use tokio_util::io::ReaderStream;
use tracing::debug;

use mediaconv_core::{ConversionError, MediaArtifact, TransientStore};

/// Deletes the artifact when dropped.
///
/// Hyper drops the body after the last chunk is written or when the client
/// goes away, so deletion happens exactly once on either path. Inside a
/// runtime the removal runs as a task; otherwise it blocks.
struct DeleteOnDrop {
    store: TransientStore,
    path: PathBuf,
}

impl Drop for DeleteOnDrop {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        debug!(path = %path.display(), "Transfer finished, deleting artifact");

        match Handle::try_current() {
            Ok(handle) => {
                let store = self.store.clone();
                handle.spawn(async move { store.delete(&path).await });
            }
            Err(_) => self.store.delete_blocking(&path),
        }
    }
}

struct TransferStream {
    inner: ReaderStream<File>,
    _guard: DeleteOnDrop,
}

impl Stream for TransferStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Streams `artifact` to the client and removes it afterwards.
pub async fn file_response(
    store: &TransientStore,
    artifact: MediaArtifact,
    media_type: &'static str,
) -> Result<Response, ConversionError> {
    let guard = DeleteOnDrop {
        store: store.clone(),
        path: artifact.path.clone(),
    };

    // The guard already owns the file, so an early return still deletes it
    let file = File::open(&artifact.path).await?;
    let length = file.metadata().await?.len();

    let body = Body::from_stream(TransferStream {
        inner: ReaderStream::new(file),
        _guard: guard,
    });

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(media_type));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
