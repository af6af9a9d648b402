use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::error::CoachError;
use crate::session::Mood;

/// Environment variables override file values, e.g.
/// `LIVE_COACH__ENDPOINTS__LIVE_BASE=https://coach.example.com`
const ENV_PREFIX: &str = "LIVE_COACH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub endpoints: EndpointsConfig,
    pub profile: ProfileConfig,
    pub coaching: CoachingConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "live-coach".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Backend locations. Every entry is optional; a missing one only fails
/// the operations that need it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Profile lookup base URL
    pub api_base: Option<String>,
    /// Token sent as `authToken` on profile lookups
    pub auth_token: Option<String>,
    /// Live coaching base URL (sessions, chat, scores, summary)
    pub live_base: Option<String>,
    /// Knowledge lookup endpoint
    pub rag_api: Option<String>,
}

impl EndpointsConfig {
    pub fn live_base(&self) -> Result<&str, CoachError> {
        non_blank(&self.live_base).ok_or(CoachError::ConfigurationMissing(
            "live coaching API base (endpoints.live_base)",
        ))
    }

    pub fn rag_api(&self) -> Result<&str, CoachError> {
        non_blank(&self.rag_api).ok_or(CoachError::ConfigurationMissing(
            "knowledge lookup endpoint (endpoints.rag_api)",
        ))
    }

    pub fn api_base(&self) -> Result<&str, CoachError> {
        non_blank(&self.api_base).ok_or(CoachError::ConfigurationMissing(
            "profile API base (endpoints.api_base)",
        ))
    }

    pub fn auth_token(&self) -> Result<&str, CoachError> {
        non_blank(&self.auth_token).ok_or(CoachError::ConfigurationMissing(
            "profile API token (endpoints.auth_token)",
        ))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(|v| v.trim_end_matches('/'))
        .filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub endpoint_id: String,
    pub client: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            endpoint_id: "F09CC251".to_string(),
            client: "saleslife".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoachingConfig {
    pub default_mood: Mood,
    /// Sent instead of the profile URL when the profile has none
    pub placeholder_linkedin_url: String,
    /// Wait after stop before asking for the scorecard
    pub scorecard_delay_ms: u64,
    /// How long a finalized line stays in the "you are saying" indicator
    pub subtitle_clear_ms: u64,
}

impl Default for CoachingConfig {
    fn default() -> Self {
        Self {
            default_mood: Mood::Professional,
            placeholder_linkedin_url: "https://www.linkedin.com/in/default-profile/".to_string(),
            scorecard_delay_ms: 2000,
            subtitle_clear_ms: 500,
        }
    }
}

impl CoachingConfig {
    pub fn scorecard_delay(&self) -> Duration {
        Duration::from_millis(self.scorecard_delay_ms)
    }

    pub fn subtitle_clear_delay(&self) -> Duration {
        Duration::from_millis(self.subtitle_clear_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Recognition language
    pub locale: String,
    /// External text-to-speech program (e.g. `say`, `espeak-ng`)
    pub synthesizer_command: Option<String>,
    /// Arguments placed before the text; `{locale}`, `{rate}` and `{pitch}`
    /// are filled from the voice parameters
    pub synthesizer_args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            synthesizer_command: None,
            synthesizer_args: Vec::new(),
        }
    }
}

impl Config {
    /// Load `path` (any format the `config` crate understands, extension
    /// optional) and overlay `LIVE_COACH__*` environment variables.
    /// A missing file is not an error.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
