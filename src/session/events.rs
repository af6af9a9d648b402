use serde::Serialize;

use super::state::Stage;
use super::tips::CoachingMode;
use super::transcript::ConversationTurn;
use super::Mood;
use crate::api::{KnowledgeAnswer, Scorecard, SessionId, Summary};

/// Change notifications for the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoachEvent {
    StageChanged { stage: Stage },
    SessionStarted { session_id: SessionId },
    TurnAppended { turn: ConversationTurn },
    /// Latest coach reply
    Subtitle { text: String },
    /// Replaces the single "listen error" slot
    Error { message: String },
    Knowledge { answer: KnowledgeAnswer },
    ScorecardReady { scorecard: Scorecard },
    SummaryReady { summary: Summary },
    MoodChanged { mood: Mood, tip: String },
    ModeChanged { mode: CoachingMode, tip: String },
}

/// Point-in-time view of the whole coaching screen
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub stage: Stage,
    pub listening: bool,
    pub session_id: Option<SessionId>,
    pub mood: Mood,
    pub mode: CoachingMode,
    pub tip: String,
    /// Latest coach reply
    pub subtitle: String,
    /// What the user is saying right now
    pub user_subtitle: String,
    pub listen_error: Option<String>,
    pub transcript: String,
    pub transcript_edited: bool,
    pub turn_count: usize,
    pub knowledge: Option<KnowledgeAnswer>,
    pub scorecard: Option<Scorecard>,
    pub summary: Option<Summary>,
}
