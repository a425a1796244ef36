//! Transient store for uploaded inputs and conversion outputs.
//!
//! The store is a root directory with one flat subdirectory per
//! [`ArtifactRole`]. There is no index: a file existing in its role
//! directory is the whole state. Every artifact gets a fresh UUIDv4 stem,
//! so concurrent requests never share a path and no locking is needed.
//!
//! Deletion is best-effort. Failures are logged and counted, never
//! returned, so cleanup can run on any exit path without masking the
//! original error.

mod types;

pub use types::{ArtifactKind, ArtifactRole, MediaArtifact};

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ConversionError;
use crate::metrics::ARTIFACT_DELETIONS;

/// Handle to the role-partitioned transient directories.
#[derive(Debug, Clone)]
pub struct TransientStore {
    root: PathBuf,
}

impl TransientStore {
    /// Creates a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding artifacts of the given role.
    pub fn role_dir(&self, role: ArtifactRole) -> PathBuf {
        self.root.join(role.dir_name())
    }

    /// Creates every role directory.
    pub async fn ensure_layout(&self) -> io::Result<()> {
        for role in ArtifactRole::ALL {
            tokio::fs::create_dir_all(self.role_dir(role)).await?;
        }
        Ok(())
    }

    /// Allocates a fresh unique path for a new artifact.
    ///
    /// Creates the role directory if it is missing. The file itself is not
    /// created; the caller (or the engine it drives) writes it.
    pub async fn allocate(
        &self,
        role: ArtifactRole,
        extension: &str,
    ) -> Result<MediaArtifact, ConversionError> {
        let dir = self.role_dir(role);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self::artifact_in(dir, role, extension))
    }

    /// Blocking variant of [`allocate`](Self::allocate) for use inside workers.
    pub fn allocate_blocking(
        &self,
        role: ArtifactRole,
        extension: &str,
    ) -> Result<MediaArtifact, ConversionError> {
        let dir = self.role_dir(role);
        std::fs::create_dir_all(&dir)?;
        Ok(Self::artifact_in(dir, role, extension))
    }

    fn artifact_in(dir: PathBuf, role: ArtifactRole, extension: &str) -> MediaArtifact {
        let id = Uuid::new_v4();
        let extension = normalize_extension(extension);
        let path = dir.join(format!("{}.{}", id, extension));
        MediaArtifact {
            id,
            kind: role.kind(),
            role,
            path,
            extension,
        }
    }

    /// Removes a file if present. Never fails.
    pub async fn delete(&self, path: &Path) {
        record_deletion(path, tokio::fs::remove_file(path).await);
    }

    /// Blocking variant of [`delete`](Self::delete), safe to call from `Drop`.
    pub fn delete_blocking(&self, path: &Path) {
        record_deletion(path, std::fs::remove_file(path));
    }

    /// Lists the files currently present for a role.
    pub fn list_role(&self, role: ArtifactRole) -> io::Result<Vec<PathBuf>> {
        let dir = self.role_dir(role);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

fn record_deletion(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => {
            debug!(path = %path.display(), "Deleted transient artifact");
            ARTIFACT_DELETIONS.with_label_values(&["deleted"]).inc();
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            ARTIFACT_DELETIONS.with_label_values(&["absent"]).inc();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to delete transient artifact");
            ARTIFACT_DELETIONS.with_label_values(&["failed"]).inc();
        }
    }
}
