// Push-fed recognition engine
//
// The actual speech-to-text runs elsewhere (a browser recognizer posting
// frames to the control API, the terminal, a test) and frames are pushed
// in through a `RecognitionFeed`. Frames only reach engines that are
// currently capturing; with nothing capturing they are dropped.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

use super::engine::{
    RecognitionEngine, RecognitionEvent, RecognitionResult, RecognitionSettings, Recognizer,
};
use crate::error::CaptureError;

#[derive(Default)]
struct FeedState {
    next_id: u64,
    /// Engines that have not been revoked yet
    engines: BTreeMap<u64, EngineEntry>,
    max_concurrent: usize,
}

struct EngineEntry {
    events: mpsc::UnboundedSender<RecognitionEvent>,
    capturing: bool,
}

impl FeedState {
    fn capturing(&self) -> usize {
        self.engines.values().filter(|e| e.capturing).count()
    }

    fn broadcast(&mut self, event: RecognitionEvent) -> bool {
        let mut delivered = false;
        for entry in self.engines.values().filter(|e| e.capturing) {
            delivered |= entry.events.send(event.clone()).is_ok();
        }
        delivered
    }
}

type Shared = Arc<Mutex<FeedState>>;

fn lock(shared: &Shared) -> MutexGuard<'_, FeedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`Recognizer`] whose engines are driven by a [`RecognitionFeed`]
#[derive(Clone, Default)]
pub struct PushRecognizer {
    shared: Shared,
}

impl PushRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle used to inject frames into whichever engine is capturing
    pub fn feed(&self) -> RecognitionFeed {
        RecognitionFeed {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Recognizer for PushRecognizer {
    fn create(
        &self,
        settings: &RecognitionSettings,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<Arc<dyn RecognitionEngine>, CaptureError> {
        let mut state = lock(&self.shared);
        let id = state.next_id;
        state.next_id += 1;
        state.engines.insert(
            id,
            EngineEntry {
                events,
                capturing: false,
            },
        );

        debug!(
            "Push engine {} created (locale={}, continuous={}, interim={})",
            id, settings.locale, settings.continuous, settings.interim_results
        );

        Ok(Arc::new(PushEngine {
            id,
            shared: Arc::clone(&self.shared),
        }))
    }

    fn name(&self) -> &str {
        "push"
    }
}

struct PushEngine {
    id: u64,
    shared: Shared,
}

#[async_trait]
impl RecognitionEngine for PushEngine {
    async fn start(&self) -> Result<(), CaptureError> {
        let mut state = lock(&self.shared);
        let entry = state
            .engines
            .get_mut(&self.id)
            .ok_or_else(|| CaptureError::Engine("engine handle revoked".to_string()))?;
        if entry.capturing {
            return Err(CaptureError::AlreadyStarted);
        }
        entry.capturing = true;

        let capturing = state.capturing();
        state.max_concurrent = state.max_concurrent.max(capturing);
        Ok(())
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        let mut state = lock(&self.shared);
        if let Some(entry) = state.engines.remove(&self.id) {
            if entry.capturing {
                let _ = entry.events.send(RecognitionEvent::End);
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        lock(&self.shared)
            .engines
            .get(&self.id)
            .map(|e| e.capturing)
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "push"
    }
}

impl Drop for PushEngine {
    fn drop(&mut self) {
        lock(&self.shared).engines.remove(&self.id);
    }
}

/// Injects recognition frames into the capturing push engine
#[derive(Clone)]
pub struct RecognitionFeed {
    shared: Shared,
}

impl RecognitionFeed {
    /// Deliver one frame. Returns false if no engine is capturing.
    pub fn push(&self, results: Vec<RecognitionResult>) -> bool {
        lock(&self.shared).broadcast(RecognitionEvent::Results(results))
    }

    pub fn push_interim(&self, text: impl Into<String>) -> bool {
        self.push(vec![RecognitionResult::interim(text)])
    }

    pub fn push_final(&self, text: impl Into<String>) -> bool {
        self.push(vec![RecognitionResult::final_result(text)])
    }

    /// Report an engine-level error
    pub fn fail(&self, message: impl Into<String>) -> bool {
        lock(&self.shared).broadcast(RecognitionEvent::Error(message.into()))
    }

    /// Simulate the engine ending on its own; capturing engines pause
    /// until started again.
    pub fn end(&self) -> bool {
        let mut state = lock(&self.shared);
        let mut delivered = false;
        for entry in state.engines.values_mut().filter(|e| e.capturing) {
            entry.capturing = false;
            delivered |= entry.events.send(RecognitionEvent::End).is_ok();
        }
        delivered
    }

    /// Number of engines capturing right now
    pub fn capturing_engines(&self) -> usize {
        lock(&self.shared).capturing()
    }

    /// Highest number of engines ever capturing at the same time
    pub fn max_concurrent_engines(&self) -> usize {
        lock(&self.shared).max_concurrent
    }

    /// Total engines created so far
    pub fn engines_created(&self) -> u64 {
        lock(&self.shared).next_id
    }
}
