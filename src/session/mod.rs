//! Live coaching session management
//!
//! This module provides the `CoachingSession` controller that manages:
//! - The Idle / Starting / Listening / Stopping lifecycle
//! - The authoritative session identifier
//! - The live transcript and coach subtitle
//! - Post-session scorecard and summary retrieval
//! - Mood and coaching-mode selection

mod config;
mod controller;
mod events;
mod mood;
mod state;
mod tips;
mod transcript;

pub use config::SessionConfig;
pub use controller::{ArtifactFetch, CoachingSession, StopOutcome, Toggle};
pub use events::{CoachEvent, SessionSnapshot};
pub use mood::Mood;
pub use state::{LifecycleState, Stage};
pub use tips::{tip, CoachingMode};
pub use transcript::{ConversationTurn, Speaker, Transcript, TranscriptLine};
