use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::CaptureError;

/// One hypothesis reported by a recognition engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Events a recognition engine delivers while capturing
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// One capture frame; may mix interim and final results
    Results(Vec<RecognitionResult>),
    /// Engine-level error; capture is not stopped by it
    Error(String),
    /// Engine stopped producing results (timeout, network, explicit stop)
    End,
}

/// Settings applied to every engine instance
#[derive(Debug, Clone)]
pub struct RecognitionSettings {
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// A single live speech-to-text engine instance
///
/// Implementations:
/// - Push: frames are fed in from outside (browser recognizer, terminal, tests)
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Begin (or resume after [`RecognitionEvent::End`]) capturing.
    ///
    /// Fails with [`CaptureError::AlreadyStarted`] if already capturing.
    async fn start(&self) -> Result<(), CaptureError>;

    /// Stop capturing and revoke this handle; later starts fail.
    async fn stop(&self) -> Result<(), CaptureError>;

    /// Check if engine is currently capturing
    fn is_capturing(&self) -> bool;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Factory for recognition engines; the capture capability itself
pub trait Recognizer: Send + Sync {
    /// Create a new, not yet started engine that reports into `events`
    fn create(
        &self,
        settings: &RecognitionSettings,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<Arc<dyn RecognitionEngine>, CaptureError>;

    fn name(&self) -> &str;
}
