use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::engine::{
    RecognitionEngine, RecognitionEvent, RecognitionResult, RecognitionSettings, Recognizer,
};
use super::Capability;
use crate::api::SessionId;
use crate::error::{CaptureError, CoachError, Result};

/// Session a capture run belongs to. Cloned by value into every event
/// produced by that run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureContext {
    pub session_id: SessionId,
}

/// One finalized unit of recognized speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// Session captured when the run started, not the live value
    pub session_id: SessionId,
    pub text: String,
}

/// What the capture controller reports upward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Utterance(Utterance),
    Error(String),
}

struct ActiveCapture {
    engine: Arc<dyn RecognitionEngine>,
    should_listen: Arc<AtomicBool>,
    pump: JoinHandle<()>,
}

/// Continuous speech capture with restart-on-end.
///
/// At most one engine instance is alive at a time: `start` always tears
/// down the previous one first.
pub struct SpeechCaptureController {
    recognizer: Capability<Arc<dyn Recognizer>>,
    settings: RecognitionSettings,
    clear_delay: Duration,
    /// Transient "you are saying" line
    indicator: Arc<watch::Sender<String>>,
    active: Option<ActiveCapture>,
}

impl SpeechCaptureController {
    pub fn new(
        recognizer: Capability<Arc<dyn Recognizer>>,
        settings: RecognitionSettings,
        clear_delay: Duration,
    ) -> Self {
        let (indicator, _) = watch::channel(String::new());
        Self {
            recognizer,
            settings,
            clear_delay,
            indicator: Arc::new(indicator),
            active: None,
        }
    }

    /// Live view of the "you are saying" indicator
    pub fn indicator(&self) -> watch::Receiver<String> {
        self.indicator.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start capturing for `context`, reporting utterances and errors into
    /// `events`.
    pub async fn start(
        &mut self,
        context: Option<CaptureContext>,
        events: mpsc::UnboundedSender<CaptureEvent>,
    ) -> Result<()> {
        let Some(context) = context.filter(|c| !c.session_id.is_empty()) else {
            error!("Attempted to start speech recognition without a session ID");
            return Err(CoachError::SessionLost);
        };

        let recognizer = match &self.recognizer {
            Capability::Available(recognizer) => Arc::clone(recognizer),
            Capability::Unavailable => {
                return Err(CoachError::CapabilityUnavailable(
                    "Speech recognition not supported in this environment".to_string(),
                ))
            }
        };

        self.stop().await;

        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let engine = recognizer.create(&self.settings, engine_tx)?;
        let should_listen = Arc::new(AtomicBool::new(true));

        info!(
            "Starting speech recognition ({}) for session {}",
            engine.name(),
            context.session_id
        );

        let pump = tokio::spawn(pump_events(
            Arc::clone(&engine),
            engine_rx,
            Arc::clone(&should_listen),
            context,
            events,
            Arc::clone(&self.indicator),
            self.clear_delay,
        ));

        self.active = Some(ActiveCapture {
            engine: Arc::clone(&engine),
            should_listen,
            pump,
        });

        match engine.start().await {
            Ok(()) => Ok(()),
            Err(CaptureError::AlreadyStarted) => {
                debug!("Recognition engine was already running");
                Ok(())
            }
            Err(e) => {
                self.stop().await;
                Err(e.into())
            }
        }
    }

    /// Stop capturing. Safe to call with nothing running.
    pub async fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.should_listen.store(false, Ordering::SeqCst);
            active.pump.abort();
            if let Err(e) = active.engine.stop().await {
                debug!("Ignoring recognition stop failure: {}", e);
            }
            info!("Speech recognition stopped");
        }
        self.indicator.send_replace(String::new());
    }
}

impl Drop for SpeechCaptureController {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.should_listen.store(false, Ordering::SeqCst);
            active.pump.abort();
        }
    }
}

/// Interim and final text of one capture frame, each trimmed; empty
/// strings mean "none in this frame".
pub fn split_frame(results: &[RecognitionResult]) -> (String, String) {
    let mut interim = String::new();
    let mut final_text = String::new();
    for result in results {
        if result.is_final {
            final_text.push_str(&result.transcript);
        } else {
            interim.push_str(&result.transcript);
        }
    }
    (interim.trim().to_string(), final_text.trim().to_string())
}

async fn pump_events(
    engine: Arc<dyn RecognitionEngine>,
    mut engine_rx: mpsc::UnboundedReceiver<RecognitionEvent>,
    should_listen: Arc<AtomicBool>,
    context: CaptureContext,
    events: mpsc::UnboundedSender<CaptureEvent>,
    indicator: Arc<watch::Sender<String>>,
    clear_delay: Duration,
) {
    debug!("Capture pump started for session {}", context.session_id);

    while let Some(event) = engine_rx.recv().await {
        match event {
            RecognitionEvent::Results(results) => {
                let (interim, final_text) = split_frame(&results);
                if !interim.is_empty() {
                    indicator.send_replace(interim);
                }
                if final_text.is_empty() {
                    continue;
                }

                indicator.send_replace(final_text.clone());
                let utterance = Utterance {
                    session_id: context.session_id.clone(),
                    text: final_text.clone(),
                };
                if events.send(CaptureEvent::Utterance(utterance)).is_err() {
                    warn!("Utterance receiver gone, stopping capture pump");
                    break;
                }
                schedule_indicator_clear(Arc::clone(&indicator), final_text, clear_delay);
            }
            RecognitionEvent::Error(message) => {
                error!("Speech recognition error: {}", message);
                let _ = events.send(CaptureEvent::Error(message));
            }
            RecognitionEvent::End => {
                if !should_listen.load(Ordering::SeqCst) {
                    break;
                }
                debug!("Recognition ended while listening, restarting");
                if let Err(e) = engine.start().await {
                    debug!("Ignoring recognition restart failure: {}", e);
                }
            }
        }
    }

    debug!("Capture pump stopped for session {}", context.session_id);
}

/// Clear the indicator after `delay` unless something newer replaced `line`
fn schedule_indicator_clear(indicator: Arc<watch::Sender<String>>, line: String, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        indicator.send_if_modified(|current| {
            if *current == line {
                current.clear();
                true
            } else {
                false
            }
        });
    });
}
