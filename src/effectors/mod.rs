//! Side-effect boundaries used by the action executor
//!
//! Each trait is the contract the executor needs from the operating system.
//! `system` holds the real adapters, `dry_run` records effects instead of
//! performing them, `speech` holds speech output adapters.

pub mod dry_run;
pub mod speech;
pub mod system;

use std::fmt;

use crate::core::error::Result;
use crate::core::types::ScrollDirection;

pub use dry_run::{DryRunEffects, Effect, EffectLog};
pub use speech::{ConsoleSpeech, EspeakSpeech};
pub use system::{SystemLauncher, SystemUrlOpener, XdotoolInjector};

/// Speech output; fire-and-forget
pub trait SpeechOutput {
    fn speak(&self, text: &str);
}

/// Synthetic keyboard and pointer input at the current focus
pub trait InputInjector {
    fn type_text(&self, text: &str) -> Result<()>;
    /// Click at the current pointer position
    fn click(&self) -> Result<()>;
    fn scroll(&self, direction: ScrollDirection) -> Result<()>;
}

/// Launches detached processes
pub trait ProcessLauncher {
    /// Returns the OS process id of the launched program
    fn launch(&self, spec: &LaunchSpec) -> Result<u32>;
}

/// Opens URLs with the operating system's default handler
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<()>;
}

/// Program plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Split a configured command line on whitespace; `None` if it is blank
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts))
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
