//! HTTP API server for local control of the coaching session
//!
//! This module provides a REST API for driving the live session:
//! - GET /health - Health check
//! - GET /coach/status - Snapshot of the coaching screen
//! - GET /coach/transcript, PUT /coach/transcript - Read or edit the notes
//! - POST /coach/listen/start, /coach/listen/stop, /coach/listen/toggle
//! - PUT /coach/mood, PUT /coach/mode - Select mood and coaching mode
//! - POST /coach/speech, POST /coach/speech/end - Recognition frames from a
//!   browser-side recognizer

mod handlers;
mod routes;
mod state;

pub use handlers::{
    ErrorResponse, ListenResponse, ModeRequest, MoodRequest, SpeechFrameRequest,
    SpeechFrameResponse, TranscriptEditRequest, TranscriptResponse,
};
pub use routes::create_router;
pub use state::AppState;
