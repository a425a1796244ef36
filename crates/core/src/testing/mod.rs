//! Testing utilities and fake engines.
//!
//! The fakes stand in for the external engines so the whole
//! acquire/dispatch/convert/cleanup flow can be exercised without ffmpeg or
//! basic-pitch installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediaconv_core::testing::{fake_service, FakeAudioCodec, FakeFrameConverter, FakePitchEngine};
//!
//! let pitch = Arc::new(FakePitchEngine::new());
//! let codec = Arc::new(FakeAudioCodec::new());
//! let frames = Arc::new(FakeFrameConverter::new(TransientStore::new(&config.storage.root)));
//! let service = fake_service(&config, pitch.clone(), codec.clone(), frames)?;
//!
//! pitch.set_next_error(ConversionError::conversion_failed("boom", None));
//! ```

mod fake_audio_codec;
mod fake_frame_converter;
mod fake_pitch_engine;

pub use fake_audio_codec::FakeAudioCodec;
pub use fake_frame_converter::FakeFrameConverter;
pub use fake_pitch_engine::{FakePitchEngine, FAKE_MIDI_BYTES};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::acquire::Acquirer;
use crate::config::Config;
use crate::converter::{MidiConverter, OutputLocator, WavConverter};
use crate::dispatch::Dispatcher;
use crate::error::ConversionError;
use crate::service::ConversionService;
use crate::store::TransientStore;

/// Builds a service whose audio engines are the given fakes.
///
/// Frame extraction uses the [`FakeFrameConverter`] too, so nothing in the
/// returned service spawns a process.
pub fn fake_service(
    config: &Config,
    pitch: Arc<FakePitchEngine>,
    codec: Arc<FakeAudioCodec>,
    frame: Arc<FakeFrameConverter>,
) -> Result<ConversionService, ConversionError> {
    let store = TransientStore::new(&config.storage.root);
    let acquirer = Acquirer::new(store.clone(), &config.download)?;
    let dispatcher = Dispatcher::from_config(store.clone(), &config.dispatcher);

    let midi = Arc::new(MidiConverter::new(
        store.clone(),
        pitch,
        OutputLocator::new(config.engines.midi_output_templates.clone()),
        OutputLocator::new(config.engines.midi_side_output_templates.clone()),
    ));
    let wav = Arc::new(WavConverter::new(store.clone(), codec));

    Ok(ConversionService::new(
        store, acquirer, dispatcher, midi, wav, frame,
    ))
}

/// Locks a fake's state, ignoring poisoning from a panicking test thread.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
