//! Remote Session Client
//!
//! Thin request/response wrapper over the live coaching backend:
//! - POST {live_base}/sessions - open a session for a profile and mood
//! - POST {live_base}/chat - one user turn, returns the coach reply
//! - POST {live_base}/scores - post-session scorecard
//! - POST {live_base}/summary - post-session summary
//! - POST {rag_api} - knowledge lookup for the Tips panel

mod client;
pub mod messages;

pub use client::{CoachingApi, HttpCoachingApi};
pub use messages::{
    KnowledgeAnswer, Objection, ScoreBand, ScoreItem, Scorecard, SessionId, Summary, SummaryReport,
};
