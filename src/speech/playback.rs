use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

use super::Capability;

/// Voice used for every reply
pub const VOICE_LOCALE: &str = "en-US";
pub const VOICE_RATE: f32 = 1.0;
pub const VOICE_PITCH: f32 = 1.0;

/// Text plus the fixed voice parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub locale: &'static str,
    pub rate: f32,
    pub pitch: f32,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: VOICE_LOCALE,
            rate: VOICE_RATE,
            pitch: VOICE_PITCH,
        }
    }
}

/// On-device text-to-speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, request: &SpeechRequest) -> Result<()>;

    fn name(&self) -> &str;
}

/// Fire-and-forget reply playback. Failures are logged and swallowed; the
/// subtitle is the fallback channel.
pub struct PlaybackSink {
    synthesizer: Capability<Arc<dyn SpeechSynthesizer>>,
}

impl PlaybackSink {
    pub fn new(synthesizer: Capability<Arc<dyn SpeechSynthesizer>>) -> Self {
        Self { synthesizer }
    }

    pub fn unavailable() -> Self {
        Self::new(Capability::Unavailable)
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_available()
    }

    pub async fn speak(&self, text: &str) {
        let Capability::Available(synthesizer) = &self.synthesizer else {
            debug!("No speech synthesizer available, subtitle only");
            return;
        };

        if let Err(e) = synthesizer.speak(&SpeechRequest::new(text)).await {
            warn!("TTS failed ({}): {:#}", synthesizer.name(), e);
        }
    }
}

/// Speaks through an external program that takes the text as its last
/// argument (`say`, `espeak-ng`, ...).
///
/// Extra arguments go before the text. `{locale}`, `{rate}` and `{pitch}`
/// inside them are replaced with the request's voice parameters, so
/// `["-v", "{locale}"]` selects the voice on `espeak-ng`.
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn command_args(&self, request: &SpeechRequest) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{locale}", request.locale)
                    .replace("{rate}", &request.rate.to_string())
                    .replace("{pitch}", &request.pitch.to_string())
            })
            .collect();
        args.push(request.text.clone());
        args
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(&self, request: &SpeechRequest) -> Result<()> {
        let args = self.command_args(request);
        debug!("Running {} {:?}", self.program, args);
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !status.success() {
            bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
