use crate::session::CoachingSession;
use crate::speech::RecognitionFeed;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single live coaching session
    pub session: CoachingSession,

    /// Entry point for recognition frames produced outside the process
    pub feed: RecognitionFeed,
}

impl AppState {
    pub fn new(session: CoachingSession, feed: RecognitionFeed) -> Self {
        Self { session, feed }
    }
}
