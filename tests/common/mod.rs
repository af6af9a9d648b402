#![allow(dead_code)]

use async_trait::async_trait;
use live_coach::api::{
    CoachingApi, KnowledgeAnswer, ScoreItem, Scorecard, SessionId, Summary, SummaryReport,
};
use live_coach::error::{CoachError, Result};
use live_coach::session::{CoachEvent, CoachingSession, Mood, SessionConfig};
use live_coach::speech::{
    Capability, PlaybackSink, PushRecognizer, RecognitionFeed, Recognizer, SpeechCaptureController,
    SpeechRequest, SpeechSynthesizer,
};
use live_coach::Profile;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::time::Instant;

/// One request the fake backend received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { linkedin_url: String, mood: Mood },
    Chat { session_id: String, message: String },
    Scores { session_id: String, at: Instant },
    Summary { session_id: String, at: Instant },
    Knowledge { query: String },
}

/// In-memory coaching backend with scripted failures and gates
#[derive(Default)]
pub struct FakeApi {
    /// Queued create outcomes; when empty, sessions are named S1, S2, ...
    pub create_outcomes: Mutex<VecDeque<std::result::Result<String, StatusCode>>>,
    pub chat_status: Mutex<Option<StatusCode>>,
    pub artifact_status: Mutex<Option<StatusCode>>,
    pub knowledge_status: Mutex<Option<StatusCode>>,
    /// Held create requests wait for a permit
    pub create_gate: Option<Arc<Semaphore>>,
    /// Held chat requests wait for a permit
    pub chat_gate: Option<Arc<Semaphore>>,
    /// Chat requests for these messages wait on their own permit
    pub message_gates: HashMap<String, Arc<Semaphore>>,
    pub calls: Mutex<Vec<Call>>,
    pub chats_answered: AtomicUsize,
    sessions_created: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create_gate(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.create_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn with_chat_gate(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.chat_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn with_message_gate(mut self, message: &str) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.message_gates
            .insert(message.to_string(), Arc::clone(&gate));
        (self, gate)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<(String, Mood)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { linkedin_url, mood } => Some((linkedin_url, mood)),
                _ => None,
            })
            .collect()
    }

    pub fn chats(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Chat {
                    session_id,
                    message,
                } => Some((session_id, message)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(operation: &'static str, status: StatusCode) -> CoachError {
        CoachError::Http {
            operation,
            status,
            body: "scripted failure".to_string(),
        }
    }
}

pub fn reply_to(message: &str) -> String {
    format!("Coach reply to {}", message)
}

pub fn scorecard_for(session_id: &str) -> Scorecard {
    Scorecard {
        items: vec![ScoreItem {
            category: "Discovery".to_string(),
            score: 7.0,
            rating: "Good".to_string(),
            comments: String::new(),
            suggestions: String::new(),
        }],
        session_id: SessionId::new(session_id),
        timestamp: None,
        total_score: 7.0,
        max_possible_score: 10.0,
        percentage: 70.0,
    }
}

pub fn summary_for(session_id: &str) -> Summary {
    Summary {
        report: SummaryReport {
            scenario_context: "Cold call".to_string(),
            strengths: vec!["Clear opener".to_string()],
            ..Default::default()
        },
        session_id: SessionId::new(session_id),
        timestamp: None,
    }
}

#[async_trait]
impl CoachingApi for FakeApi {
    async fn create_session(&self, linkedin_url: &str, mood: Mood) -> Result<SessionId> {
        self.record(Call::Create {
            linkedin_url: linkedin_url.to_string(),
            mood,
        });
        if let Some(gate) = &self.create_gate {
            gate.acquire().await.unwrap().forget();
        }

        let n = self.sessions_created.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.create_outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(Ok(id)) => Ok(SessionId::new(id)),
            Some(Err(status)) => Err(Self::failure("Live", status)),
            None => Ok(SessionId::new(format!("S{}", n))),
        }
    }

    async fn send_chat(&self, session_id: &SessionId, message: &str) -> Result<String> {
        self.record(Call::Chat {
            session_id: session_id.to_string(),
            message: message.to_string(),
        });
        if let Some(gate) = &self.chat_gate {
            gate.acquire().await.unwrap().forget();
        }
        if let Some(gate) = self.message_gates.get(message) {
            gate.acquire().await.unwrap().forget();
        }
        self.chats_answered.fetch_add(1, Ordering::SeqCst);

        let status = *self.chat_status.lock().unwrap();
        match status {
            Some(status) => Err(Self::failure("Chat", status)),
            None => Ok(reply_to(message)),
        }
    }

    async fn fetch_scorecard(&self, session_id: &SessionId) -> Result<Scorecard> {
        self.record(Call::Scores {
            session_id: session_id.to_string(),
            at: Instant::now(),
        });
        let status = *self.artifact_status.lock().unwrap();
        match status {
            Some(status) => Err(Self::failure("Scores", status)),
            None => Ok(scorecard_for(session_id.as_str())),
        }
    }

    async fn fetch_summary(&self, session_id: &SessionId) -> Result<Summary> {
        self.record(Call::Summary {
            session_id: session_id.to_string(),
            at: Instant::now(),
        });
        let status = *self.artifact_status.lock().unwrap();
        match status {
            Some(status) => Err(Self::failure("Summary", status)),
            None => Ok(summary_for(session_id.as_str())),
        }
    }

    async fn query_knowledge(&self, query: &str) -> Result<KnowledgeAnswer> {
        self.record(Call::Knowledge {
            query: query.to_string(),
        });
        let status = *self.knowledge_status.lock().unwrap();
        match status {
            Some(status) => Err(Self::failure("Knowledge", status)),
            None => Ok(KnowledgeAnswer {
                answer: format!("Background on: {}", query),
                sources: vec![],
            }),
        }
    }
}

/// Synthesizer that remembers what it was asked to say
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingSynthesizer {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn speak(&self, request: &SpeechRequest) -> anyhow::Result<()> {
        self.spoken.lock().unwrap().push(request.text.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// A controller wired to fakes, plus handles to observe them
pub struct Harness {
    pub session: CoachingSession,
    pub api: Arc<FakeApi>,
    pub feed: RecognitionFeed,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub events: broadcast::Receiver<CoachEvent>,
}

pub fn harness(api: FakeApi) -> Harness {
    harness_with(api, None, true)
}

pub fn harness_with(api: FakeApi, profile: Option<Profile>, can_listen: bool) -> Harness {
    let config = SessionConfig::default();
    let recognizer = PushRecognizer::new();
    let feed = recognizer.feed();
    let recognizer: Capability<Arc<dyn Recognizer>> = if can_listen {
        Capability::Available(Arc::new(recognizer))
    } else {
        Capability::Unavailable
    };
    let capture = SpeechCaptureController::new(
        recognizer,
        config.recognition.clone(),
        config.subtitle_clear_delay,
    );

    let synthesizer = Arc::new(RecordingSynthesizer::default());
    let playback = PlaybackSink::new(Capability::Available(
        Arc::clone(&synthesizer) as Arc<dyn SpeechSynthesizer>
    ));

    let api = Arc::new(api);
    let session = CoachingSession::new(
        Arc::clone(&api) as Arc<dyn CoachingApi>,
        capture,
        playback,
        profile,
        config,
    );
    let events = session.subscribe();

    Harness {
        session,
        api,
        feed,
        synthesizer,
        events,
    }
}

/// Next event matching `pred`, skipping others
pub async fn wait_for<F>(events: &mut broadcast::Receiver<CoachEvent>, mut pred: F) -> CoachEvent
where
    F: FnMut(&CoachEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) => continue,
                Err(e) => panic!("event stream failed: {}", e),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Poll `cond` until it holds
pub async fn wait_until<F>(mut cond: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never became true");
}
