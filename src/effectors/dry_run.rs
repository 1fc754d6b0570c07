//! Effect recorder used by `--dry-run`
//!
//! Implements every effect trait by logging the effect and appending it to a
//! shared log instead of touching the desktop.

use std::sync::{Arc, Mutex};

use crate::core::error::Result;
use crate::core::types::ScrollDirection;
use crate::effectors::{InputInjector, LaunchSpec, ProcessLauncher, UrlOpener};

/// An effect that would have been performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Typed(String),
    Clicked,
    Scrolled(ScrollDirection),
    Launched(LaunchSpec),
    Opened(String),
}

/// Shared, append-only list of recorded effects
#[derive(Debug, Clone, Default)]
pub struct EffectLog(Arc<Mutex<Vec<Effect>>>);

impl EffectLog {
    pub fn record(&self, effect: Effect) {
        tracing::info!("[dry-run] {:?}", effect);
        if let Ok(mut effects) = self.0.lock() {
            effects.push(effect);
        }
    }

    /// Copy of everything recorded so far, in order
    pub fn snapshot(&self) -> Vec<Effect> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

/// Records effects instead of performing them
#[derive(Debug, Clone, Default)]
pub struct DryRunEffects {
    log: EffectLog,
}

impl DryRunEffects {
    pub fn log(&self) -> &EffectLog {
        &self.log
    }
}

impl InputInjector for DryRunEffects {
    fn type_text(&self, text: &str) -> Result<()> {
        self.log.record(Effect::Typed(text.to_string()));
        Ok(())
    }

    fn click(&self) -> Result<()> {
        self.log.record(Effect::Clicked);
        Ok(())
    }

    fn scroll(&self, direction: ScrollDirection) -> Result<()> {
        self.log.record(Effect::Scrolled(direction));
        Ok(())
    }
}

impl ProcessLauncher for DryRunEffects {
    fn launch(&self, spec: &LaunchSpec) -> Result<u32> {
        self.log.record(Effect::Launched(spec.clone()));
        Ok(0)
    }
}

impl UrlOpener for DryRunEffects {
    fn open(&self, url: &str) -> Result<()> {
        self.log.record(Effect::Opened(url.to_string()));
        Ok(())
    }
}
