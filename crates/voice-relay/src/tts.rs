//! Speech synthesis through the `edge-tts` command-line tool.

use voice_relay_core::{
    CoreError, CoreResult,
    pipeline::{Synthesizer, VoiceParams},
};

use std::{
    ffi::OsString,
    panic::Location,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs `edge-tts` to render text to a fixed MP3 file.
pub struct EdgeTtsSynthesizer {
    command: PathBuf,
    output: PathBuf,
}

impl EdgeTtsSynthesizer {
    /// Synthesize with `command`, writing to `output` on every call.
    pub fn new(command: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
        }
    }
}

impl Synthesizer for EdgeTtsSynthesizer {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice = %voice.voice))]
    fn synthesize(&self, text: &str, voice: &VoiceParams) -> CoreResult<Option<PathBuf>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        // A leftover file from the previous utterance must not pass for new output.
        if let Err(e) = std::fs::remove_file(&self.output)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            debug!(path = ?self.output, error = %e, "Could not remove previous synthesis output");
        }

        let mut command = Command::new(&self.command);
        command
            .args(command_args(text, voice, &self.output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let output = command.output().map_err(|e| {
            synthesis_error(format!(
                "Failed to run {}: {}",
                self.command.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(synthesis_error(format!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                stderr.trim()
            )));
        }

        if !self.output.exists() {
            return Err(synthesis_error(format!(
                "No audio written to {}",
                self.output.display()
            )));
        }

        debug!(path = ?self.output, "Speech synthesized");

        Ok(Some(self.output.clone()))
    }
}

/// Arguments for one `edge-tts` invocation.
///
/// Rate and volume use the `--opt=value` form so values starting with `-`
/// are not read as flags.
pub fn command_args(text: &str, voice: &VoiceParams, output: &Path) -> Vec<OsString> {
    vec![
        OsString::from("--voice"),
        OsString::from(&voice.voice),
        OsString::from(format!("--rate={}", voice.rate)),
        OsString::from(format!("--volume={}", voice.volume)),
        OsString::from("--text"),
        OsString::from(text),
        OsString::from("--write-media"),
        output.as_os_str().to_os_string(),
    ]
}

#[track_caller]
fn synthesis_error(reason: String) -> CoreError {
    CoreError::SynthesisFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
