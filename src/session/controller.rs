use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::events::{CoachEvent, SessionSnapshot};
use super::state::{LifecycleState, Stage};
use super::tips::{self, CoachingMode};
use super::transcript::{ConversationTurn, Speaker, Transcript};
use super::Mood;
use crate::api::{CoachingApi, KnowledgeAnswer, Scorecard, SessionId, Summary};
use crate::error::{CoachError, Result};
use crate::profile::Profile;
use crate::speech::{CaptureContext, CaptureEvent, PlaybackSink, SpeechCaptureController, Utterance};

/// Capacity of the event broadcast; slow subscribers lag rather than block
const EVENT_CAPACITY: usize = 256;

/// Result of [`CoachingSession::toggle_listening`]
#[derive(Debug)]
pub enum Toggle {
    Started(SessionId),
    Stopped(StopOutcome),
}

/// What a stop kicked off
#[derive(Debug, Default)]
pub struct StopOutcome {
    /// Session that was active when stop was pressed
    pub session_id: Option<SessionId>,
    /// Post-session fetches, present iff there was a session
    pub artifacts: Option<ArtifactFetch>,
}

/// Background summary and scorecard requests started by a stop.
///
/// Both are best-effort; `None` means the artifact is not available.
#[derive(Debug)]
pub struct ArtifactFetch {
    pub summary: JoinHandle<Option<Summary>>,
    pub scorecard: JoinHandle<Option<Scorecard>>,
}

struct Inner {
    state: LifecycleState,
    attempts: u64,
    /// Session whose late results are still welcome: the active one, or
    /// the one just stopped. Cleared when a new session is requested.
    latest_session: Option<SessionId>,
    mood: Mood,
    mode: CoachingMode,
    transcript: Transcript,
    subtitle: String,
    listen_error: Option<String>,
    knowledge: Option<KnowledgeAnswer>,
    scorecard: Option<Scorecard>,
    summary: Option<Summary>,
    dispatcher: Option<JoinHandle<()>>,
}

impl Inner {
    fn accepts(&self, session_id: &SessionId) -> bool {
        self.latest_session.as_ref() == Some(session_id)
    }

    fn tip(&self) -> String {
        tips::tip(self.mood, self.mode).to_string()
    }

    fn stop_dispatcher(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.abort();
        }
    }
}

struct Shared {
    api: Arc<dyn CoachingApi>,
    /// Lock order: `capture` before `inner`
    capture: Mutex<SpeechCaptureController>,
    user_subtitle: watch::Receiver<String>,
    playback: PlaybackSink,
    profile: Option<Profile>,
    config: SessionConfig,
    inner: Mutex<Inner>,
    events: broadcast::Sender<CoachEvent>,
}

/// Session Lifecycle Controller for the live coaching screen.
///
/// Owns the session identifier, the live transcript and the listening
/// state. Every asynchronous step is handed the identifier it must use at
/// the moment it is created and never re-reads the live value, so a stop
/// or a new session cannot redirect in-flight work.
#[derive(Clone)]
pub struct CoachingSession {
    shared: Arc<Shared>,
}

impl CoachingSession {
    pub fn new(
        api: Arc<dyn CoachingApi>,
        capture: SpeechCaptureController,
        playback: PlaybackSink,
        profile: Option<Profile>,
        config: SessionConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = Inner {
            state: LifecycleState::Idle,
            attempts: 0,
            latest_session: None,
            mood: config.initial_mood,
            mode: CoachingMode::default(),
            transcript: Transcript::new(),
            subtitle: String::new(),
            listen_error: None,
            knowledge: None,
            scorecard: None,
            summary: None,
            dispatcher: None,
        };

        Self {
            shared: Arc::new(Shared {
                api,
                user_subtitle: capture.indicator(),
                capture: Mutex::new(capture),
                playback,
                profile,
                config,
                inner: Mutex::new(inner),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoachEvent> {
        self.shared.events.subscribe()
    }

    /// Live "you are saying" line
    pub fn user_subtitle(&self) -> watch::Receiver<String> {
        self.shared.user_subtitle.clone()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.shared.profile.as_ref()
    }

    pub async fn stage(&self) -> Stage {
        self.shared.inner.lock().await.state.stage()
    }

    pub async fn is_listening(&self) -> bool {
        self.shared.inner.lock().await.state.is_listening()
    }

    /// Authoritative session identifier
    pub async fn session_id(&self) -> Option<SessionId> {
        self.shared.inner.lock().await.state.session_id().cloned()
    }

    pub async fn mood(&self) -> Mood {
        self.shared.inner.lock().await.mood
    }

    pub async fn transcript(&self) -> Transcript {
        self.shared.inner.lock().await.transcript.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let user_subtitle = self.shared.user_subtitle.borrow().clone();
        let inner = self.shared.inner.lock().await;

        SessionSnapshot {
            stage: inner.state.stage(),
            listening: inner.state.is_listening(),
            session_id: inner.state.session_id().cloned(),
            mood: inner.mood,
            mode: inner.mode,
            tip: inner.tip(),
            subtitle: inner.subtitle.clone(),
            user_subtitle,
            listen_error: inner.listen_error.clone(),
            transcript: inner.transcript.text().to_string(),
            transcript_edited: inner.transcript.is_edited(),
            turn_count: inner.transcript.turns().len(),
            knowledge: inner.knowledge.clone(),
            scorecard: inner.scorecard.clone(),
            summary: inner.summary.clone(),
        }
    }

    /// Select the mood for the next session; a running session keeps the
    /// mood it was created with.
    pub async fn set_mood(&self, mood: Mood) {
        let tip = {
            let mut inner = self.shared.inner.lock().await;
            inner.mood = mood;
            inner.tip()
        };
        info!("Mood set to {}", mood);
        self.shared.emit(CoachEvent::MoodChanged { mood, tip });
    }

    pub async fn set_mode(&self, mode: CoachingMode) {
        let tip = {
            let mut inner = self.shared.inner.lock().await;
            inner.mode = mode;
            inner.tip()
        };
        info!("Mode set to {}", mode);
        self.shared.emit(CoachEvent::ModeChanged { mode, tip });
    }

    /// Overwrite the free-text notes
    pub async fn edit_transcript(&self, text: impl Into<String>) {
        self.shared.inner.lock().await.transcript.edit(text);
    }

    /// Start when idle, stop when listening
    pub async fn toggle_listening(&self) -> Result<Toggle> {
        let stage = self.stage().await;
        match stage {
            Stage::Idle => self.start_listening().await.map(Toggle::Started),
            Stage::Listening => self.stop_listening().await.map(Toggle::Stopped),
            Stage::Starting | Stage::Stopping => Err(CoachError::InvalidTransition {
                from: stage.to_string(),
                action: "toggle listening",
            }),
        }
    }

    /// Idle → Starting → Listening.
    ///
    /// Creates a backend session with the current mood and the profile's
    /// LinkedIn URL, then starts capture bound to the returned identifier.
    /// On failure the error is recorded and the state returns to Idle
    /// without capture.
    pub async fn start_listening(&self) -> Result<SessionId> {
        let shared = &self.shared;

        let (attempt, mood) = {
            let mut inner = shared.inner.lock().await;
            let attempt = inner.attempts + 1;
            inner
                .state
                .transition(LifecycleState::Starting { attempt }, "start listening")?;
            inner.attempts = attempt;
            inner.latest_session = None;
            inner.listen_error = None;
            (attempt, inner.mood)
        };
        shared.emit(CoachEvent::StageChanged {
            stage: Stage::Starting,
        });

        let linkedin_url = match shared.profile.as_ref().and_then(Profile::session_url) {
            Some(url) => url.to_string(),
            None => {
                warn!("LinkedIn URL is missing, using fallback URL");
                shared.config.placeholder_linkedin_url.clone()
            }
        };

        let session_id = match shared.api.create_session(&linkedin_url, mood).await {
            Ok(session_id) => session_id,
            Err(e) => {
                error!("Error creating session: {}", e);
                shared.abandon_start(attempt, &e).await;
                return Err(e);
            }
        };

        let mut capture = shared.capture.lock().await;
        if shared.inner.lock().await.state != (LifecycleState::Starting { attempt }) {
            info!("Discarding session {} from a cancelled start", session_id);
            return Err(CoachError::StartCancelled);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let context = CaptureContext {
            session_id: session_id.clone(),
        };
        if let Err(e) = capture.start(Some(context), tx).await {
            drop(capture);
            error!("Failed to start speech recognition: {}", e);
            shared.abandon_start(attempt, &e).await;
            return Err(e);
        }

        let mut inner = shared.inner.lock().await;
        if inner.state != (LifecycleState::Starting { attempt }) {
            drop(inner);
            capture.stop().await;
            info!("Discarding session {} from a cancelled start", session_id);
            return Err(CoachError::StartCancelled);
        }

        inner.state.transition(
            LifecycleState::Listening {
                session_id: session_id.clone(),
            },
            "start listening",
        )?;
        inner.latest_session = Some(session_id.clone());
        inner.stop_dispatcher();
        inner.dispatcher = Some(tokio::spawn(dispatch(Arc::clone(shared), rx)));
        drop(inner);
        drop(capture);

        info!("Listening with session {}", session_id);
        shared.emit(CoachEvent::StageChanged {
            stage: Stage::Listening,
        });
        shared.emit(CoachEvent::SessionStarted {
            session_id: session_id.clone(),
        });

        Ok(session_id)
    }

    /// Listening → Stopping → Idle.
    ///
    /// Stops capture, clears the identifier, then fetches the summary at
    /// once and the scorecard after the configured delay, both for the
    /// session that was active. Calling it while Starting abandons the
    /// pending start; calling it while Idle does nothing.
    pub async fn stop_listening(&self) -> Result<StopOutcome> {
        let shared = &self.shared;

        let session_id = {
            let mut inner = shared.inner.lock().await;
            match inner.state.clone() {
                LifecycleState::Idle => {
                    debug!("Stop requested while idle");
                    return Ok(StopOutcome::default());
                }
                LifecycleState::Starting { attempt } => {
                    inner.state.transition(LifecycleState::Idle, "cancel start")?;
                    drop(inner);
                    info!("Session start {} cancelled", attempt);
                    shared.emit(CoachEvent::StageChanged { stage: Stage::Idle });
                    return Ok(StopOutcome::default());
                }
                LifecycleState::Stopping { .. } => {
                    return Err(CoachError::InvalidTransition {
                        from: Stage::Stopping.to_string(),
                        action: "stop listening",
                    });
                }
                LifecycleState::Listening { session_id } => {
                    inner.state.transition(
                        LifecycleState::Stopping {
                            session_id: session_id.clone(),
                        },
                        "stop listening",
                    )?;
                    session_id
                }
            }
        };
        shared.emit(CoachEvent::StageChanged {
            stage: Stage::Stopping,
        });

        shared.capture.lock().await.stop().await;

        {
            let mut inner = shared.inner.lock().await;
            inner.stop_dispatcher();
            inner.state.transition(LifecycleState::Idle, "stop listening")?;
        }
        shared.emit(CoachEvent::StageChanged { stage: Stage::Idle });
        info!(
            "Session {} stopped, fetching summary and scorecard",
            session_id
        );

        let summary = tokio::spawn(Arc::clone(shared).fetch_summary(session_id.clone()));
        let scorecard = {
            let shared = Arc::clone(shared);
            let session_id = session_id.clone();
            let delay = shared.config.scorecard_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                shared.fetch_scorecard(session_id).await
            })
        };

        Ok(StopOutcome {
            session_id: Some(session_id),
            artifacts: Some(ArtifactFetch { summary, scorecard }),
        })
    }
}

/// Forward capture events; every utterance becomes its own concurrent turn
async fn dispatch(shared: Arc<Shared>, mut rx: mpsc::UnboundedReceiver<CaptureEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            CaptureEvent::Utterance(utterance) => {
                tokio::spawn(Arc::clone(&shared).run_turn(utterance));
            }
            CaptureEvent::Error(message) => {
                shared
                    .record_error(format!("Speech recognition error: {}", message))
                    .await;
            }
        }
    }
}

impl Shared {
    fn emit(&self, event: CoachEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn record_error(&self, message: String) {
        self.inner.lock().await.listen_error = Some(message.clone());
        self.emit(CoachEvent::Error { message });
    }

    /// Starting → Idle after a failed start, unless the attempt was
    /// already abandoned
    async fn abandon_start(&self, attempt: u64, err: &CoachError) {
        let mut inner = self.inner.lock().await;
        if inner.state != (LifecycleState::Starting { attempt }) {
            return;
        }
        inner.state = LifecycleState::Idle;
        inner.listen_error = Some(err.to_string());
        drop(inner);

        self.emit(CoachEvent::StageChanged { stage: Stage::Idle });
        self.emit(CoachEvent::Error {
            message: err.to_string(),
        });
    }

    /// utterance → user turn → chat → coach turn + subtitle → tips + speech
    async fn run_turn(self: Arc<Self>, utterance: Utterance) {
        let Utterance { session_id, text } = utterance;

        {
            let turn = ConversationTurn::new(Speaker::User, text.clone());
            self.inner.lock().await.transcript.append(turn.clone());
            self.emit(CoachEvent::TurnAppended { turn });
        }

        if session_id.is_empty() {
            error!("Session ID lost during speech recognition");
            self.fail_turn(&session_id, CoachError::SessionLost).await;
            return;
        }

        debug!("Sending chat with captured session ID: {}", session_id);
        let reply = match self.api.send_chat(&session_id, &text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Chat failed for session {}: {}", session_id, e);
                self.fail_turn(&session_id, e).await;
                return;
            }
        };

        if reply.trim().is_empty() {
            debug!("Empty reply for session {}", session_id);
            return;
        }

        let still_listening = {
            let mut inner = self.inner.lock().await;
            if !inner.accepts(&session_id) {
                info!("Discarding reply for superseded session {}", session_id);
                return;
            }
            let turn = ConversationTurn::new(Speaker::Coach, reply.clone());
            inner.transcript.append(turn.clone());
            inner.subtitle = reply.clone();
            self.emit(CoachEvent::TurnAppended { turn });
            self.emit(CoachEvent::Subtitle {
                text: reply.clone(),
            });
            inner.state.is_listening_to(&session_id)
        };

        if still_listening {
            tokio::join!(
                self.lookup_knowledge(&session_id, &reply),
                self.playback.speak(&reply)
            );
        } else {
            debug!("Session {} no longer listening, not speaking reply", session_id);
            self.lookup_knowledge(&session_id, &reply).await;
        }
    }

    /// Record a turn failure; if it belongs to the listening session, drop
    /// back to Idle with capture stopped
    async fn fail_turn(&self, session_id: &SessionId, err: CoachError) {
        let message = err.to_string();
        let mut capture = self.capture.lock().await;
        let mut inner = self.inner.lock().await;

        inner.listen_error = Some(message.clone());
        let forced = inner.state.is_listening()
            && (session_id.is_empty() || inner.state.is_listening_to(session_id));
        if forced {
            inner.stop_dispatcher();
            inner.state = LifecycleState::Idle;
        }
        drop(inner);

        if forced {
            capture.stop().await;
            warn!("Listening stopped after failed turn: {}", message);
            self.emit(CoachEvent::StageChanged { stage: Stage::Idle });
        }
        drop(capture);

        self.emit(CoachEvent::Error { message });
    }

    async fn lookup_knowledge(&self, session_id: &SessionId, reply: &str) {
        match self.api.query_knowledge(reply).await {
            Ok(answer) => {
                let mut inner = self.inner.lock().await;
                if !inner.accepts(session_id) {
                    debug!("Discarding knowledge answer for session {}", session_id);
                    return;
                }
                inner.knowledge = Some(answer.clone());
                self.emit(CoachEvent::Knowledge { answer });
            }
            Err(e) => warn!("Error querying knowledge API: {}", e),
        }
    }

    async fn fetch_summary(self: Arc<Self>, session_id: SessionId) -> Option<Summary> {
        let summary = match self.api.fetch_summary(&session_id).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    "Failed to fetch summary for {} - this is normal if session just ended: {}",
                    session_id, e
                );
                return None;
            }
        };

        if summary.session_id != session_id {
            warn!(
                "Summary for {} arrived tagged {}, ignoring",
                session_id, summary.session_id
            );
            return None;
        }

        let mut inner = self.inner.lock().await;
        if !inner.accepts(&session_id) {
            debug!("Discarding summary for superseded session {}", session_id);
            return None;
        }
        info!("Received summary for session {}", session_id);
        inner.summary = Some(summary.clone());
        self.emit(CoachEvent::SummaryReady {
            summary: summary.clone(),
        });
        Some(summary)
    }

    async fn fetch_scorecard(&self, session_id: SessionId) -> Option<Scorecard> {
        let scorecard = match self.api.fetch_scorecard(&session_id).await {
            Ok(scorecard) => scorecard,
            Err(e) => {
                warn!(
                    "Failed to fetch scores for {} - this is normal if session just ended: {}",
                    session_id, e
                );
                return None;
            }
        };

        if scorecard.session_id != session_id {
            warn!(
                "Scorecard for {} arrived tagged {}, ignoring",
                session_id, scorecard.session_id
            );
            return None;
        }

        let mut inner = self.inner.lock().await;
        if !inner.accepts(&session_id) {
            debug!("Discarding scorecard for superseded session {}", session_id);
            return None;
        }
        info!(
            "Received scorecard for session {}: {}/{}",
            session_id, scorecard.total_score, scorecard.max_possible_score
        );
        inner.scorecard = Some(scorecard.clone());
        self.emit(CoachEvent::ScorecardReady {
            scorecard: scorecard.clone(),
        });
        Some(scorecard)
    }
}
