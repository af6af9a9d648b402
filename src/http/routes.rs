use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session queries
        .route("/coach/status", get(handlers::get_status))
        .route(
            "/coach/transcript",
            get(handlers::get_transcript).put(handlers::edit_transcript),
        )
        // Listening control
        .route("/coach/listen/start", post(handlers::start_listening))
        .route("/coach/listen/stop", post(handlers::stop_listening))
        .route("/coach/listen/toggle", post(handlers::toggle_listening))
        // Settings
        .route("/coach/mood", put(handlers::set_mood))
        .route("/coach/mode", put(handlers::set_mode))
        // Recognition frames from a browser-side recognizer
        .route("/coach/speech", post(handlers::push_speech))
        .route("/coach/speech/end", post(handlers::end_speech))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
