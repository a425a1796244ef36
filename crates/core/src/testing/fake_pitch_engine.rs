//! Fake pitch-detection engine.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use super::lock;
use crate::converter::{PitchEngine, STEM_PLACEHOLDER};
use crate::error::ConversionError;

/// A minimal MIDI header chunk (format 1, one track, 480 ticks).
pub const FAKE_MIDI_BYTES: &[u8] = b"MThd\x00\x00\x00\x06\x00\x01\x00\x01\x01\xe0";

/// Fake implementation of [`PitchEngine`].
///
/// Writes [`FAKE_MIDI_BYTES`] under a configurable name template, plus any
/// configured side files, and records every input it was given.
#[derive(Debug)]
pub struct FakePitchEngine {
    output_template: Mutex<Option<String>>,
    side_templates: Mutex<Vec<String>>,
    next_error: Mutex<Option<ConversionError>>,
    diagnostics: Mutex<Option<String>>,
    delay: Mutex<Duration>,
    calls: Mutex<Vec<PathBuf>>,
}

impl Default for FakePitchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePitchEngine {
    /// Creates an engine that names its output like basic-pitch does.
    pub fn new() -> Self {
        Self {
            output_template: Mutex::new(Some("{stem}_basic_pitch.mid".to_string())),
            side_templates: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
            diagnostics: Mutex::new(None),
            delay: Mutex::new(Duration::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sets the name template of the MIDI output.
    pub fn set_output_template(&self, template: impl Into<String>) {
        *lock(&self.output_template) = Some(template.into());
    }

    /// Makes the engine succeed without writing any MIDI file.
    pub fn set_no_output(&self) {
        *lock(&self.output_template) = None;
    }

    /// Extra files written next to the MIDI output.
    pub fn set_side_outputs(&self, templates: Vec<String>) {
        *lock(&self.side_templates) = templates;
    }

    /// Configure the next transcription to fail with the given error.
    ///
    /// Side outputs are still written first, as a crashing engine would.
    pub fn set_next_error(&self, error: ConversionError) {
        *lock(&self.next_error) = Some(error);
    }

    /// Text reported as the engine's stderr on successful runs.
    pub fn set_diagnostics(&self, text: impl Into<String>) {
        *lock(&self.diagnostics) = Some(text.into());
    }

    /// Simulated processing time.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = delay;
    }

    /// Inputs seen so far.
    pub fn calls(&self) -> Vec<PathBuf> {
        lock(&self.calls).clone()
    }
}

impl PitchEngine for FakePitchEngine {
    fn name(&self) -> &str {
        "fake-pitch"
    }

    fn transcribe(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<Option<String>, ConversionError> {
        lock(&self.calls).push(input.to_path_buf());

        let delay = *lock(&self.delay);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input")
            .to_string();

        for template in lock(&self.side_templates).iter() {
            std::fs::write(output_dir.join(template.replace(STEM_PLACEHOLDER, &stem)), b"side")?;
        }

        if let Some(err) = lock(&self.next_error).take() {
            return Err(err);
        }

        if let Some(template) = lock(&self.output_template).as_ref() {
            let output = output_dir.join(template.replace(STEM_PLACEHOLDER, &stem));
            std::fs::write(output, FAKE_MIDI_BYTES)?;
        }

        Ok(lock(&self.diagnostics).clone())
    }
}
