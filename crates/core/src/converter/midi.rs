//! Audio to MIDI conversion through a pitch-detection engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::engine::run_engine;
use super::locator::OutputLocator;
use super::traits::{Converter, PitchEngine};
use crate::config::EngineConfig;
use crate::error::ConversionError;
use crate::store::{ArtifactRole, MediaArtifact, TransientStore};

/// Runs the `basic-pitch` command line tool.
///
/// Invoked as `basic-pitch [args...] <output_dir> <input>`.
#[derive(Debug, Clone)]
pub struct BasicPitchCli {
    program: PathBuf,
    args: Vec<String>,
}

impl BasicPitchCli {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.basic_pitch_path, config.basic_pitch_args.clone())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn build_args(&self, input: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(output_dir.to_string_lossy().to_string());
        args.push(input.to_string_lossy().to_string());
        args
    }
}

impl PitchEngine for BasicPitchCli {
    fn name(&self) -> &str {
        "basic-pitch"
    }

    fn transcribe(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<Option<String>, ConversionError> {
        let args = self.build_args(input, output_dir);
        let output = run_engine(self.name(), &self.program, &args)?.check_status(self.name())?;
        Ok(output.stderr_text())
    }
}

/// Converts MP3 input into a `<uuid>.mid` artifact.
pub struct MidiConverter {
    store: TransientStore,
    engine: Arc<dyn PitchEngine>,
    outputs: OutputLocator,
    side_outputs: OutputLocator,
}

impl MidiConverter {
    pub fn new(
        store: TransientStore,
        engine: Arc<dyn PitchEngine>,
        outputs: OutputLocator,
        side_outputs: OutputLocator,
    ) -> Self {
        Self {
            store,
            engine,
            outputs,
            side_outputs,
        }
    }

    /// Builds the converter around the `basic-pitch` CLI.
    pub fn from_config(store: TransientStore, config: &EngineConfig) -> Self {
        Self::new(
            store,
            Arc::new(BasicPitchCli::from_config(config)),
            OutputLocator::new(config.midi_output_templates.clone()),
            OutputLocator::new(config.midi_side_output_templates.clone()),
        )
    }

    /// Removes every file the engine may have produced for `stem`.
    fn remove_engine_outputs(&self, dir: &Path, stem: &str) {
        let outputs = self.outputs.existing(dir, stem);
        let side_outputs = self.side_outputs.existing(dir, stem);
        for path in outputs.iter().chain(side_outputs.iter()) {
            self.store.delete_blocking(path);
        }
    }
}

impl Converter for MidiConverter {
    type Options = ();

    fn name(&self) -> &'static str {
        "midi"
    }

    fn convert(&self, input: &Path, _options: &()) -> Result<MediaArtifact, ConversionError> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConversionError::invalid_input(format!(
                    "Input path has no usable file stem: {}",
                    input.display()
                ))
            })?
            .to_string();

        let output_dir = self.store.role_dir(ArtifactRole::Midi);
        std::fs::create_dir_all(&output_dir)?;

        info!(engine = self.engine.name(), input = %input.display(), "Transcribing audio to MIDI");

        let diagnostics = match self.engine.transcribe(input, &output_dir) {
            Ok(diagnostics) => diagnostics,
            Err(e) => {
                self.remove_engine_outputs(&output_dir, &stem);
                return Err(e);
            }
        };

        let Some(produced) = self.outputs.locate(&output_dir, &stem) else {
            self.remove_engine_outputs(&output_dir, &stem);
            return Err(ConversionError::conversion_incomplete(
                format!(
                    "{} finished but produced no MIDI file (tried: {})",
                    self.engine.name(),
                    self.outputs.templates().join(", ")
                ),
                diagnostics,
            ));
        };

        let artifact = match self.store.allocate_blocking(ArtifactRole::Midi, "mid") {
            Ok(artifact) => artifact,
            Err(e) => {
                self.remove_engine_outputs(&output_dir, &stem);
                return Err(e);
            }
        };

        if let Err(e) = std::fs::rename(&produced, &artifact.path) {
            self.remove_engine_outputs(&output_dir, &stem);
            self.store.delete_blocking(&artifact.path);
            return Err(e.into());
        }

        // Leftover candidates and side files are not part of the result
        self.remove_engine_outputs(&output_dir, &stem);

        debug!(
            from = %produced.display(),
            to = %artifact.path.display(),
            "Renamed MIDI output"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_pitch_args() {
        let cli = BasicPitchCli::new("basic-pitch", vec!["--save-midi".to_string()]);
        let args = cli.build_args(Path::new("/in/abc.mp3"), Path::new("/out/midis"));
        assert_eq!(args, vec!["--save-midi", "/out/midis", "/in/abc.mp3"]);
    }

    #[test]
    fn test_from_config_uses_paths() {
        let config = EngineConfig {
            basic_pitch_path: PathBuf::from("/opt/bp/bin/basic-pitch"),
            ..Default::default()
        };
        let cli = BasicPitchCli::from_config(&config);
        assert_eq!(cli.program(), Path::new("/opt/bp/bin/basic-pitch"));
    }
}
