//! Device-facing speech collaborators
//!
//! - Capture: continuous speech-to-text with restart-on-end ([`SpeechCaptureController`])
//! - Playback: reply text-to-speech ([`PlaybackSink`])
//!
//! Both sit behind injected capabilities so sessions run without a real
//! microphone or speaker.

mod capture;
mod engine;
mod playback;
mod push;

pub use capture::{split_frame, CaptureContext, CaptureEvent, SpeechCaptureController, Utterance};
pub use engine::{
    RecognitionEngine, RecognitionEvent, RecognitionResult, RecognitionSettings, Recognizer,
};
pub use playback::{
    CommandSynthesizer, PlaybackSink, SpeechRequest, SpeechSynthesizer, VOICE_LOCALE, VOICE_PITCH,
    VOICE_RATE,
};
pub use push::{PushRecognizer, RecognitionFeed};

/// A platform capability that may be missing at runtime
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Capability::Available(inner),
            None => Capability::Unavailable,
        }
    }
}
