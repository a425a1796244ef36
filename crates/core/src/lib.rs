//! Core library for the media conversion service.
//!
//! Inputs are acquired into a [`TransientStore`], converted on the blocking
//! pool by the [`Dispatcher`], and handed back as [`MediaArtifact`]s. The
//! [`ConversionService`] ties these together per request.

pub mod acquire;
pub mod config;
pub mod converter;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod response;
pub mod service;
pub mod store;
pub mod testing;

pub use acquire::{Acquirer, MediaKind, MediaSource, UploadedFile};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError,
};
pub use converter::{
    check_engines, Converter, FrameOptions, FramePosition, FrameRequest, ImageFormat,
};
pub use dispatch::{Dispatcher, DispatcherStatus};
pub use error::{ConversionError, ErrorKind};
pub use response::{build_download_url, ConvertResponse, ErrorBody};
pub use service::{AudioTarget, ConversionService};
pub use store::{ArtifactKind, ArtifactRole, MediaArtifact, TransientStore};
