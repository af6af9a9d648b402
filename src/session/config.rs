use std::time::Duration;

use super::Mood;
use crate::config::Config;
use crate::speech::RecognitionSettings;

/// Configuration for a coaching session controller
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Mood selected when the controller is created
    pub initial_mood: Mood,

    /// LinkedIn URL sent when the profile has none
    pub placeholder_linkedin_url: String,

    /// Wait after stop before requesting the scorecard
    /// Default: 2 seconds, giving the backend time to score
    pub scorecard_delay: Duration,

    /// How long a finalized line stays in the "you are saying" indicator
    pub subtitle_clear_delay: Duration,

    /// Recognition engine settings (continuous, interim results)
    pub recognition: RecognitionSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_mood: Mood::Professional,
            placeholder_linkedin_url: "https://www.linkedin.com/in/default-profile/".to_string(),
            scorecard_delay: Duration::from_secs(2),
            subtitle_clear_delay: Duration::from_millis(500),
            recognition: RecognitionSettings::default(),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            initial_mood: cfg.coaching.default_mood,
            placeholder_linkedin_url: cfg.coaching.placeholder_linkedin_url.clone(),
            scorecard_delay: cfg.coaching.scorecard_delay(),
            subtitle_clear_delay: cfg.coaching.subtitle_clear_delay(),
            recognition: RecognitionSettings {
                locale: cfg.speech.locale.clone(),
                ..RecognitionSettings::default()
            },
        }
    }
}
