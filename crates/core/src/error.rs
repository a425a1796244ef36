//! Error types shared by acquisition, dispatch and the converters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while acquiring or converting a media file.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Missing, conflicting or malformed request parameters.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The remote fetch failed (network error, timeout or non-success status).
    #[error("Download failed: {reason}")]
    DownloadFailed { reason: String },

    /// A required external tool could not be located.
    #[error("{engine} not found at path: {path}")]
    EngineNotFound { engine: String, path: PathBuf },

    /// The engine ran but produced no usable output.
    #[error("Conversion incomplete: {reason}")]
    ConversionIncomplete {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine reported an error or exited with a non-zero code.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The conversion did not finish within the configured limit.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while reading or writing store files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializable discriminant of [`ConversionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    DownloadFailed,
    EngineNotFound,
    ConversionIncomplete,
    ConversionFailed,
    Timeout,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::DownloadFailed => "download_failed",
            Self::EngineNotFound => "engine_not_found",
            Self::ConversionIncomplete => "conversion_incomplete",
            Self::ConversionFailed => "conversion_failed",
            Self::Timeout => "timeout",
            Self::Io => "io",
        }
    }
}

impl ConversionError {
    /// Creates a new invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a new download failed error.
    pub fn download_failed(reason: impl Into<String>) -> Self {
        Self::DownloadFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new engine not found error.
    pub fn engine_not_found(engine: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::EngineNotFound {
            engine: engine.into(),
            path: path.into(),
        }
    }

    /// Creates a new conversion incomplete error with optional stderr output.
    pub fn conversion_incomplete(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionIncomplete {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new conversion failed error with optional stderr output.
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            Self::EngineNotFound { .. } => ErrorKind::EngineNotFound,
            Self::ConversionIncomplete { .. } => ErrorKind::ConversionIncomplete,
            Self::ConversionFailed { .. } => ErrorKind::ConversionFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Diagnostic text captured from the engine, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ConversionIncomplete { stderr, .. } | Self::ConversionFailed { stderr, .. } => {
                stderr.as_deref()
            }
            _ => None,
        }
    }

    /// Human-readable message including the engine diagnostics.
    pub fn detailed_message(&self) -> String {
        match self.stderr() {
            Some(stderr) if !stderr.trim().is_empty() => {
                format!("{}: {}", self, stderr.trim())
            }
            _ => self.to_string(),
        }
    }
}
