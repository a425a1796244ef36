//! Acquire, convert and clean up: the per-request conversion flow.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::acquire::{Acquirer, MediaKind, MediaSource};
use crate::config::Config;
use crate::converter::{
    Converter, FfmpegAudioCodec, FrameConverter, FrameOptions, MidiConverter, WavConverter,
};
use crate::dispatch::Dispatcher;
use crate::error::ConversionError;
use crate::store::{MediaArtifact, TransientStore};

/// Audio conversion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioTarget {
    Midi,
    Wav,
}

/// Converter with no per-call options.
pub type AudioConverter = Arc<dyn Converter<Options = ()>>;

/// Converter producing still frames.
pub type StillFrameConverter = Arc<dyn Converter<Options = FrameOptions>>;

/// Runs a whole conversion request against the transient store.
///
/// The input artifact is deleted on every path before a result is
/// returned. On failure the converter has already removed its own
/// output, so nothing from the request remains.
#[derive(Clone)]
pub struct ConversionService {
    store: TransientStore,
    acquirer: Acquirer,
    dispatcher: Dispatcher,
    midi: AudioConverter,
    wav: AudioConverter,
    frame: StillFrameConverter,
}

impl ConversionService {
    pub fn new(
        store: TransientStore,
        acquirer: Acquirer,
        dispatcher: Dispatcher,
        midi: AudioConverter,
        wav: AudioConverter,
        frame: StillFrameConverter,
    ) -> Self {
        Self {
            store,
            acquirer,
            dispatcher,
            midi,
            wav,
            frame,
        }
    }

    /// Wires the default engines from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConversionError> {
        let store = TransientStore::new(&config.storage.root);
        let acquirer = Acquirer::new(store.clone(), &config.download)?;
        let dispatcher = Dispatcher::from_config(store.clone(), &config.dispatcher);

        let midi = Arc::new(MidiConverter::from_config(store.clone(), &config.engines));
        let wav = Arc::new(WavConverter::new(
            store.clone(),
            Arc::new(FfmpegAudioCodec::new(&config.engines.ffmpeg_path)),
        ));
        let frame = Arc::new(FrameConverter::new(
            store.clone(),
            &config.engines.ffmpeg_path,
        ));

        Ok(Self::new(store, acquirer, dispatcher, midi, wav, frame))
    }

    pub fn store(&self) -> &TransientStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Converts MP3 audio into MIDI or WAV.
    pub async fn convert_audio(
        &self,
        source: MediaSource,
        target: AudioTarget,
    ) -> Result<MediaArtifact, ConversionError> {
        let converter = match target {
            AudioTarget::Midi => self.midi.clone(),
            AudioTarget::Wav => self.wav.clone(),
        };
        self.acquire_and_convert(source, MediaKind::Audio, converter, ())
            .await
    }

    /// Extracts a still frame from a video.
    pub async fn extract_frame(
        &self,
        source: MediaSource,
        options: FrameOptions,
    ) -> Result<MediaArtifact, ConversionError> {
        self.acquire_and_convert(source, MediaKind::Video, self.frame.clone(), options)
            .await
    }

    async fn acquire_and_convert<C>(
        &self,
        source: MediaSource,
        kind: MediaKind,
        converter: Arc<C>,
        options: C::Options,
    ) -> Result<MediaArtifact, ConversionError>
    where
        C: Converter + ?Sized + 'static,
    {
        let input = self.acquirer.acquire(source, kind).await?;
        debug!(input = %input.path.display(), "Acquired input");

        let result = self
            .dispatcher
            .dispatch(converter, input.path.clone(), options)
            .await;

        self.store.delete(&input.path).await;

        let output = result?;
        info!(
            role = output.role.dir_name(),
            file = %output.file_name(),
            "Produced artifact"
        );
        Ok(output)
    }
}
