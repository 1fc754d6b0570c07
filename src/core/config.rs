//! Agent configuration with documented defaults
//!
//! Configuration is read once at startup and never reloaded. Values are
//! layered, lowest precedence first: built-in defaults, an optional TOML
//! file, `PILOT_*` environment variables, then command-line flags (applied
//! by the binary).

use ahash::AHashMap;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::error::{PilotError, Result};

/// Environment variable overriding `planner.base_url`
pub const ENV_PLANNER_URL: &str = "PILOT_PLANNER_URL";
/// Environment variable overriding `user_id`
pub const ENV_USER_ID: &str = "PILOT_USER_ID";
/// Environment variable overriding `wake_phrase`
pub const ENV_WAKE_PHRASE: &str = "PILOT_WAKE_PHRASE";

/// Top-level agent configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Identifier sent with every plan request so the planner can keep per-user memory
    pub user_id: String,

    /// Utterance that opens a command cycle (matched case-insensitively as a substring)
    pub wake_phrase: String,

    pub planner: PlannerConfig,
    pub speech: SpeechConfig,
    pub voice: VoiceConfig,
    pub pacing: PacingConfig,

    /// Extra or overriding app launch commands: spoken name -> command line
    pub apps: AHashMap<String, String>,
}

/// Remote planner endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Base URL; requests go to `<base_url>/command`
    pub base_url: String,

    /// Whole-request timeout. The planner is never retried automatically,
    /// so this bounds how long one cycle can block on the network.
    pub timeout_secs: u64,
}

/// Which speech output adapter to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Print utterances to stdout
    Console,
    /// Pipe utterances through the `espeak` binary
    Espeak,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub backend: SpeechBackend,
    /// Words per minute
    pub rate: u32,
    /// Output volume in 0.0..=1.0
    pub volume: f32,
}

/// Which voice input adapter to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceBackend {
    /// Read transcripts line by line from stdin
    Console,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub backend: VoiceBackend,
}

/// Delays between steps, in milliseconds
///
/// The settle delays give the desktop time to react to an action before the
/// next one lands. Zero everywhere is valid and is what tests use.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// After launching an application
    pub open_app_ms: u64,
    /// After typing text
    pub type_text_ms: u64,
    /// After a click
    pub click_ms: u64,
    /// After opening a URL (browsers are slow to take focus)
    pub go_to_url_ms: u64,
    /// After a scroll
    pub scroll_ms: u64,
    /// Pause between wake-phrase polls
    pub idle_ms: u64,
    /// Pause after an unexpected failure at the loop boundary
    pub backoff_ms: u64,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            user_id: "desktop_pilot_user".into(),
            wake_phrase: "hey agent".into(),
            planner: PlannerConfig::default(),
            speech: SpeechConfig::default(),
            voice: VoiceConfig::default(),
            pacing: PacingConfig::default(),
            apps: AHashMap::new(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::Console,
            rate: 180,
            volume: 0.9,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            backend: VoiceBackend::Console,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            open_app_ms: 2000,
            type_text_ms: 500,
            click_ms: 500,
            go_to_url_ms: 3000,
            scroll_ms: 500,
            idle_ms: 1000,
            backoff_ms: 2000,
        }
    }
}

impl PacingConfig {
    /// No delays at all
    pub fn immediate() -> Self {
        Self {
            open_app_ms: 0,
            type_text_ms: 0,
            click_ms: 0,
            go_to_url_ms: 0,
            scroll_ms: 0,
            idle_ms: 0,
            backoff_ms: 0,
        }
    }

    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl PilotConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PilotError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PilotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `PILOT_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup (empty values are ignored)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_PLANNER_URL) {
            self.planner.base_url = url;
        }
        if let Some(user_id) = get(ENV_USER_ID) {
            self.user_id = user_id;
        }
        if let Some(phrase) = get(ENV_WAKE_PHRASE) {
            self.wake_phrase = phrase;
        }
    }

    /// Planner request timeout
    pub fn planner_timeout(&self) -> Duration {
        Duration::from_secs(self.planner.timeout_secs)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.planner.base_url.trim().is_empty() {
            return Err(PilotError::Config("planner.base_url must not be empty".into()));
        }
        if !self.planner.base_url.starts_with("http://")
            && !self.planner.base_url.starts_with("https://")
        {
            return Err(PilotError::Config(format!(
                "planner.base_url ({}) must be an http(s) URL",
                self.planner.base_url
            )));
        }
        if self.planner.timeout_secs == 0 {
            return Err(PilotError::Config("planner.timeout_secs must be positive".into()));
        }
        if self.user_id.trim().is_empty() {
            return Err(PilotError::Config("user_id must not be empty".into()));
        }
        if self.wake_phrase.trim().is_empty() {
            return Err(PilotError::Config("wake_phrase must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.speech.volume) {
            return Err(PilotError::Config(format!(
                "speech.volume ({}) must be within 0.0..=1.0",
                self.speech.volume
            )));
        }
        Ok(())
    }
}
