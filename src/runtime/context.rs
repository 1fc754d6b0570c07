//! Process-wide collaborator handles
//!
//! Built once at startup and passed by reference to the orchestrator and the
//! executor. Nothing here is mutated after construction.

use crate::command::resolver::AppResolver;
use crate::core::config::{PacingConfig, PilotConfig, SpeechBackend, VoiceBackend};
use crate::effectors::{
    ConsoleSpeech, DryRunEffects, EspeakSpeech, InputInjector, ProcessLauncher, SpeechOutput,
    SystemLauncher, SystemUrlOpener, UrlOpener, XdotoolInjector,
};
use crate::sensors::{ConsoleVoiceInput, ScreenContextProvider, VoiceInput, WindowTitleSensor};

pub struct RuntimeContext {
    pub speech: Box<dyn SpeechOutput>,
    pub voice: Box<dyn VoiceInput>,
    pub screen: Box<dyn ScreenContextProvider>,
    pub input: Box<dyn InputInjector>,
    pub launcher: Box<dyn ProcessLauncher>,
    pub urls: Box<dyn UrlOpener>,
    pub apps: AppResolver,
    pub pacing: PacingConfig,
}

impl RuntimeContext {
    /// Real adapters for every boundary
    pub fn from_config(config: &PilotConfig) -> Self {
        Self {
            speech: speech_for(config),
            voice: voice_for(config),
            screen: Box::new(WindowTitleSensor),
            input: Box::new(XdotoolInjector::new()),
            launcher: Box::new(SystemLauncher),
            urls: Box::new(SystemUrlOpener::default()),
            apps: AppResolver::new(&config.apps),
            pacing: config.pacing.clone(),
        }
    }

    /// Real speech, voice and screen; desktop effects are only logged
    pub fn dry_run(config: &PilotConfig, effects: DryRunEffects) -> Self {
        Self {
            input: Box::new(effects.clone()),
            launcher: Box::new(effects.clone()),
            urls: Box::new(effects),
            ..Self::from_config(config)
        }
    }

    /// Speak and log in one place so every announcement shows up in traces
    pub fn announce(&self, text: &str) {
        tracing::debug!(announcement = text);
        self.speech.speak(text);
    }
}

fn speech_for(config: &PilotConfig) -> Box<dyn SpeechOutput> {
    match config.speech.backend {
        SpeechBackend::Console => Box::new(ConsoleSpeech),
        SpeechBackend::Espeak => Box::new(EspeakSpeech::new(&config.speech)),
    }
}

fn voice_for(config: &PilotConfig) -> Box<dyn VoiceInput> {
    match config.voice.backend {
        VoiceBackend::Console => Box::new(ConsoleVoiceInput::new()),
    }
}
