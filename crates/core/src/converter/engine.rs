//! Subprocess plumbing shared by the command-line engines.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use crate::error::ConversionError;

/// Exit status and diagnostics of a finished engine process.
#[derive(Debug)]
pub struct EngineOutput {
    pub status: ExitStatus,
    pub stderr: String,
}

impl EngineOutput {
    /// Captured stderr, or `None` when the engine printed nothing.
    pub fn stderr_text(&self) -> Option<String> {
        let trimmed = self.stderr.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Converts a non-zero exit into `ConversionFailed`.
    pub fn check_status(self, engine: &str) -> Result<Self, ConversionError> {
        if self.status.success() {
            return Ok(self);
        }
        Err(ConversionError::conversion_failed(
            format!("{} exited with code: {:?}", engine, self.status.code()),
            self.stderr_text(),
        ))
    }
}

/// Runs `program` to completion, blocking the current thread.
///
/// Stdout is discarded and stderr captured. A missing binary is reported as
/// `EngineNotFound`.
pub fn run_engine(
    engine: &str,
    program: &Path,
    args: &[String],
) -> Result<EngineOutput, ConversionError> {
    debug!(engine, program = %program.display(), ?args, "Running engine");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| spawn_error(engine, program, e))?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stderr.trim().is_empty() {
        debug!(engine, stderr = %stderr.trim(), "Engine diagnostics");
    }

    Ok(EngineOutput {
        status: output.status,
        stderr,
    })
}

/// Checks that `program` can be started, by running it with `probe_arg`.
///
/// Only a failure to spawn counts; the exit code is ignored since engines
/// disagree on what `--version`/`--help` return.
pub async fn check_engine(
    engine: &str,
    program: &Path,
    probe_arg: &str,
) -> Result<(), ConversionError> {
    tokio::process::Command::new(program)
        .arg(probe_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| spawn_error(engine, program, e))?;
    Ok(())
}

fn spawn_error(engine: &str, program: &Path, e: std::io::Error) -> ConversionError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ConversionError::engine_not_found(engine, program)
    } else {
        ConversionError::Io(e)
    }
}
