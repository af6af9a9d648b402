use super::state::AppState;
use crate::api::SessionId;
use crate::error::CoachError;
use crate::profile::Profile;
use crate::session::{CoachingMode, Mood, Stage, StopOutcome, Toggle, TranscriptLine};
use crate::speech::RecognitionResult;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListenResponse {
    pub stage: Stage,
    pub session_id: Option<SessionId>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub text: String,
    pub edited: bool,
    pub lines: Vec<TranscriptLine>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptEditRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodRequest {
    pub mood: Mood,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeRequest {
    pub mode: CoachingMode,
}

/// One capture frame as produced by a browser recognizer
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechFrameRequest {
    pub results: Vec<RecognitionResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechFrameResponse {
    /// False when nothing was capturing and the frame was dropped
    pub delivered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: &CoachError) -> Response {
    let status = match err {
        CoachError::InvalidTransition { .. } | CoachError::StartCancelled => StatusCode::CONFLICT,
        CoachError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoachError::CapabilityUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoachError::Http { .. }
        | CoachError::Network { .. }
        | CoachError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn started(session_id: SessionId) -> Response {
    (
        StatusCode::OK,
        Json(ListenResponse {
            stage: Stage::Listening,
            message: format!("Listening with session {}", session_id),
            session_id: Some(session_id),
        }),
    )
        .into_response()
}

fn stopped(outcome: StopOutcome) -> Response {
    let message = match &outcome.session_id {
        Some(id) => format!("Session {} stopped, fetching summary and scorecard", id),
        None => "Not listening".to_string(),
    };

    (
        StatusCode::OK,
        Json(ListenResponse {
            stage: Stage::Idle,
            session_id: outcome.session_id,
            message,
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /coach/status
/// Snapshot of the coaching screen
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.session.snapshot().await))
}

/// GET /coach/transcript
/// Notes plus their per-line rendering
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let transcript = state.session.transcript().await;
    let coach_name = state.session.profile().and_then(Profile::first_name);

    (
        StatusCode::OK,
        Json(TranscriptResponse {
            text: transcript.text().to_string(),
            edited: transcript.is_edited(),
            lines: transcript.lines(coach_name),
        }),
    )
}

/// PUT /coach/transcript
/// Overwrite the notes with free text
pub async fn edit_transcript(
    State(state): State<AppState>,
    Json(req): Json<TranscriptEditRequest>,
) -> impl IntoResponse {
    state.session.edit_transcript(req.text).await;
    get_transcript(State(state)).await
}

/// POST /coach/listen/start
pub async fn start_listening(State(state): State<AppState>) -> Response {
    info!("Start listening requested");

    match state.session.start_listening().await {
        Ok(session_id) => started(session_id),
        Err(e) => {
            error!("Failed to start listening: {}", e);
            error_response(&e)
        }
    }
}

/// POST /coach/listen/stop
/// Returns immediately; summary and scorecard land in the status later
pub async fn stop_listening(State(state): State<AppState>) -> Response {
    info!("Stop listening requested");

    match state.session.stop_listening().await {
        Ok(outcome) => stopped(outcome),
        Err(e) => {
            error!("Failed to stop listening: {}", e);
            error_response(&e)
        }
    }
}

/// POST /coach/listen/toggle
pub async fn toggle_listening(State(state): State<AppState>) -> Response {
    match state.session.toggle_listening().await {
        Ok(Toggle::Started(session_id)) => started(session_id),
        Ok(Toggle::Stopped(outcome)) => stopped(outcome),
        Err(e) => {
            warn!("Toggle rejected: {}", e);
            error_response(&e)
        }
    }
}

/// PUT /coach/mood
/// Applies to the next session only
pub async fn set_mood(
    State(state): State<AppState>,
    Json(req): Json<MoodRequest>,
) -> impl IntoResponse {
    state.session.set_mood(req.mood).await;
    (StatusCode::OK, Json(state.session.snapshot().await))
}

/// PUT /coach/mode
pub async fn set_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> impl IntoResponse {
    state.session.set_mode(req.mode).await;
    (StatusCode::OK, Json(state.session.snapshot().await))
}

/// POST /coach/speech
/// Push one recognition frame into the capturing engine
pub async fn push_speech(
    State(state): State<AppState>,
    Json(req): Json<SpeechFrameRequest>,
) -> impl IntoResponse {
    let delivered = state.feed.push(req.results);
    (StatusCode::OK, Json(SpeechFrameResponse { delivered }))
}

/// POST /coach/speech/end
/// The browser recognizer ended on its own
pub async fn end_speech(State(state): State<AppState>) -> impl IntoResponse {
    let delivered = state.feed.end();
    (StatusCode::OK, Json(SpeechFrameResponse { delivered }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
