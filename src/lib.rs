pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod profile;
pub mod session;
pub mod speech;

pub use api::{CoachingApi, HttpCoachingApi, Scorecard, SessionId, Summary};
pub use config::Config;
pub use error::{CaptureError, CoachError, Result};
pub use http::{create_router, AppState};
pub use profile::{Profile, ProfileClient};
pub use session::{
    CoachEvent, CoachingMode, CoachingSession, Mood, SessionConfig, SessionSnapshot, Stage,
};
pub use speech::{
    Capability, PlaybackSink, PushRecognizer, RecognitionFeed, SpeechCaptureController,
};
