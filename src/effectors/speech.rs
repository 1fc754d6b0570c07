//! Speech output adapters

use std::process::{Command, Stdio};

use crate::core::config::SpeechConfig;
use crate::effectors::SpeechOutput;

/// Prints utterances to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) {
        println!("AI: {}", text);
    }
}

/// Speaks through the `espeak` binary, falling back to the console
#[derive(Debug, Clone)]
pub struct EspeakSpeech {
    rate: u32,
    amplitude: u32,
}

impl EspeakSpeech {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            rate: config.rate,
            amplitude: espeak_amplitude(config.volume),
        }
    }
}

impl SpeechOutput for EspeakSpeech {
    fn speak(&self, text: &str) {
        println!("AI: {}", text);

        // Blocks until the utterance finishes so speech never overlaps actions
        let result = Command::new("espeak")
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(self.amplitude.to_string())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!("espeak exited with {}", status),
            Err(e) => tracing::warn!("espeak unavailable: {}", e),
        }
    }
}

/// espeak amplitude runs 0..=200 with 100 as normal
fn espeak_amplitude(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 200.0).round() as u32
}
