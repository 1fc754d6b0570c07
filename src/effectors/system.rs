//! Operating-system adapters for input injection, app launch, and URL opening

use std::io;
use std::process::{Command, Stdio};

use crate::core::error::{PilotError, Result};
use crate::core::types::ScrollDirection;
use crate::effectors::{InputInjector, LaunchSpec, ProcessLauncher, UrlOpener};

/// Wheel clicks per SCROLL action
pub const SCROLL_CLICKS: u32 = 5;

/// Input injection through the `xdotool` binary (X11)
#[derive(Debug, Clone)]
pub struct XdotoolInjector {
    binary: String,
}

impl Default for XdotoolInjector {
    fn default() -> Self {
        Self {
            binary: "xdotool".into(),
        }
    }
}

impl XdotoolInjector {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        let status = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|e| spawn_error(&self.binary, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(PilotError::Collaborator(format!(
                "{} {} exited with {}",
                self.binary,
                args.first().copied().unwrap_or_default(),
                status
            )))
        }
    }
}

impl InputInjector for XdotoolInjector {
    fn type_text(&self, text: &str) -> Result<()> {
        self.run(&["type", "--", text])
    }

    fn click(&self) -> Result<()> {
        self.run(&["click", "1"])
    }

    fn scroll(&self, direction: ScrollDirection) -> Result<()> {
        // X11 maps wheel up/down to buttons 4/5
        let button = match direction {
            ScrollDirection::Up => "4",
            ScrollDirection::Down => "5",
        };
        let repeat = SCROLL_CLICKS.to_string();
        self.run(&["click", "--repeat", &repeat, button])
    }
}

/// Launches programs as detached children
///
/// On unix each child leads its own process group, so a Ctrl-C aimed at the
/// agent does not reach launched apps. A reaper thread waits on every child.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<u32> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|e| spawn_error(&spec.program, e))?;

        let pid = child.id();
        tracing::debug!(pid, program = %spec.program, "Launched process");

        let program = spec.program.clone();
        std::thread::Builder::new()
            .name(format!("reap-{}", pid))
            .spawn(move || match child.wait() {
                Ok(status) => tracing::debug!(pid, program = %program, %status, "Launched process exited"),
                Err(e) => tracing::warn!(pid, program = %program, "Failed to reap process: {}", e),
            })
            .map_err(|e| PilotError::Collaborator(format!("Failed to start reaper: {}", e)))?;

        Ok(pid)
    }
}

/// Opens URLs with the platform's default-handler command
#[derive(Debug, Clone, Default)]
pub struct SystemUrlOpener {
    launcher: SystemLauncher,
}

impl SystemUrlOpener {
    /// The platform command that hands `url` to the default handler
    ///
    /// No shell sits between us and the handler, so `&`, `|` and `^` in a
    /// query string reach it as plain characters.
    pub fn command_for(url: &str) -> LaunchSpec {
        if cfg!(target_os = "windows") {
            LaunchSpec::new("rundll32").with_args(["url.dll,FileProtocolHandler", url])
        } else if cfg!(target_os = "macos") {
            LaunchSpec::new("open").with_args([url])
        } else {
            LaunchSpec::new("xdg-open").with_args([url])
        }
    }
}

impl UrlOpener for SystemUrlOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.launcher.launch(&Self::command_for(url)).map(|_| ())
    }
}

fn spawn_error(program: &str, e: io::Error) -> PilotError {
    if e.kind() == io::ErrorKind::NotFound {
        PilotError::Collaborator(format!("{} not found on PATH", program))
    } else {
        PilotError::Collaborator(format!("Failed to run {}: {}", program, e))
    }
}
