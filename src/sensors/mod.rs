//! Input boundaries: voice transcripts and screen context
//!
//! Speech recognition and window inspection are external; these traits are
//! what the orchestrator needs from them, with thin default adapters.

use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::error::{PilotError, Result};
use crate::core::types::window_context;

/// Produces transcripts
pub trait VoiceInput {
    /// `Ok(None)` when nothing intelligible was heard.
    /// `Err(Recognition)` when the recognizer itself failed.
    fn listen(&self) -> Result<Option<String>>;
}

/// Describes what is currently on screen
pub trait ScreenContextProvider {
    fn current_context(&self) -> Result<String>;
}

/// Reads one transcript per line from stdin
///
/// Stands in for a microphone + recognizer: whatever is typed is treated as
/// what was heard.
#[derive(Debug, Default)]
pub struct ConsoleVoiceInput {
    closed: AtomicBool,
}

impl ConsoleVoiceInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VoiceInput for ConsoleVoiceInput {
    fn listen(&self) -> Result<Option<String>> {
        if self.closed.load(Ordering::Relaxed) {
            return Ok(None);
        }

        print!("Listening for command... > ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| PilotError::Recognition(e.to_string()))?;

        if read == 0 {
            tracing::warn!("stdin closed; no further transcripts");
            self.closed.store(true, Ordering::Relaxed);
            return Ok(None);
        }

        let transcript = line.trim();
        if transcript.is_empty() {
            Ok(None)
        } else {
            tracing::info!("You said: {}", transcript);
            Ok(Some(transcript.to_string()))
        }
    }
}

/// Active window title via `xdotool getactivewindow getwindowname`
#[derive(Debug, Clone, Default)]
pub struct WindowTitleSensor;

impl ScreenContextProvider for WindowTitleSensor {
    fn current_context(&self) -> Result<String> {
        let output = Command::new("xdotool")
            .args(["getactivewindow", "getwindowname"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| PilotError::Collaborator(format!("Failed to run xdotool: {}", e)))?;

        if !output.status.success() {
            return Err(PilotError::Collaborator(format!(
                "xdotool exited with {}",
                output.status
            )));
        }

        let title = String::from_utf8_lossy(&output.stdout);
        Ok(window_context(title.trim()))
    }
}

/// Always reports the same context
#[derive(Debug, Clone)]
pub struct StaticContext(pub String);

impl ScreenContextProvider for StaticContext {
    fn current_context(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Case-insensitive substring match of the wake phrase
pub fn contains_wake_phrase(transcript: &str, wake_phrase: &str) -> bool {
    transcript
        .to_lowercase()
        .contains(&wake_phrase.trim().to_lowercase())
}
