//! Types for the transient store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// The role an artifact plays, which also selects its subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    /// Input acquired from an upload or a remote URL.
    Upload,
    /// MIDI produced by the pitch engine.
    Midi,
    /// WAV produced by the audio codec.
    Wav,
    /// Still frame produced by the video transcoder.
    Frame,
}

impl ArtifactRole {
    pub const ALL: [ArtifactRole; 4] = [Self::Upload, Self::Midi, Self::Wav, Self::Frame];

    /// Returns the subdirectory name for this role.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Upload => "uploads",
            Self::Midi => "midis",
            Self::Wav => "wavs",
            Self::Frame => "frames",
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Upload => ArtifactKind::UploadInput,
            Self::Midi | Self::Wav | Self::Frame => ArtifactKind::ConversionOutput,
        }
    }
}

/// Whether an artifact is a request input or a converter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    UploadInput,
    ConversionOutput,
}

/// A file materialized in the transient store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaArtifact {
    /// Unique identifier, also the filename stem.
    pub id: Uuid,
    pub kind: ArtifactKind,
    pub role: ArtifactRole,
    /// Full path inside the role subdirectory.
    pub path: PathBuf,
    /// Extension without the leading dot, lowercase.
    pub extension: String,
}

impl MediaArtifact {
    /// Returns the filename (`<id>.<extension>`).
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.extension)
    }

    /// Returns the path relative to the store root, always `/`-separated.
    pub fn relative_location(&self) -> String {
        format!("{}/{}", self.role.dir_name(), self.file_name())
    }
}
