use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use super::model::{Personality, Profile, WorkEntry};
use crate::config::{EndpointsConfig, ProfileConfig};
use crate::error::{CoachError, Result};

/// Header carrying the profile API token
const AUTH_HEADER: &str = "authToken";

/// Whether `url` looks like a LinkedIn person or company page
pub fn is_valid_linkedin_url(url: &str) -> bool {
    url.contains("linkedin.com/in/") || url.contains("linkedin.com/company/")
}

/// Profile enrichment lookup
pub struct ProfileClient {
    client: Client,
    endpoints: EndpointsConfig,
    settings: ProfileConfig,
}

impl ProfileClient {
    pub fn new(endpoints: EndpointsConfig, settings: ProfileConfig) -> Self {
        Self {
            client: Client::new(),
            endpoints,
            settings,
        }
    }

    /// Fetch and map the profile behind a LinkedIn URL
    pub async fn lookup(&self, linkedin_url: &str) -> Result<Profile> {
        let linkedin_url = linkedin_url.trim();
        if linkedin_url.is_empty() {
            return Err(CoachError::InvalidInput("LinkedIn URL is required".to_string()));
        }
        if !is_valid_linkedin_url(linkedin_url) {
            return Err(CoachError::InvalidInput(
                "Please enter a valid LinkedIn profile URL".to_string(),
            ));
        }

        let api_base = self.endpoints.api_base()?;
        let token = self.endpoints.auth_token()?;
        let url = format!("{}/{}", api_base, self.settings.endpoint_id);

        info!("Looking up profile for {}", linkedin_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("linkedin_url", linkedin_url),
                ("x-client", self.settings.client.as_str()),
            ])
            .header(ACCEPT, "application/json")
            .header(AUTH_HEADER, token)
            .send()
            .await
            .map_err(|e| CoachError::network("Profile", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Profile API returned error status {}: {}", status, text);
            return Err(CoachError::Http {
                operation: "Profile",
                status,
                body: if text.is_empty() {
                    status.canonical_reason().unwrap_or_default().to_string()
                } else {
                    text
                },
            });
        }

        let envelope: ProfileEnvelope = response
            .json()
            .await
            .map_err(|e| CoachError::malformed("Profile", e.to_string()))?;

        Ok(map_profile(envelope, linkedin_url))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub data: Option<ProfileData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub person: Option<WirePerson>,
    #[serde(default)]
    pub insights: Option<WireInsights>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WirePerson {
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub profile_pic: Option<String>,
    pub current_work: Option<WireWork>,
    pub work_list: Vec<WireWork>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireWork {
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub role: Option<String>,
    pub is_current: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub linkedin: Option<String>,
}

impl WireWork {
    fn title(&self) -> Option<&str> {
        non_empty(&self.position).or_else(|| non_empty(&self.role))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireInsights {
    pub adjectives: Vec<String>,
    pub personality_types: Vec<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Map the lookup payload into a [`Profile`]; `submitted_url` stands in
/// when the payload carries no URL of its own.
pub fn map_profile(envelope: ProfileEnvelope, submitted_url: &str) -> Profile {
    let data = envelope.data.unwrap_or_default();
    let person = data.person.unwrap_or_default();

    let name = match non_empty(&person.display_name) {
        Some(display) => display.to_string(),
        None => format!(
            "{} {}",
            person.first_name.as_deref().unwrap_or_default(),
            person.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string(),
    };

    let current = person.current_work.as_ref();
    let title = current
        .and_then(WireWork::title)
        .unwrap_or_default()
        .to_string();
    let company = current
        .and_then(|w| non_empty(&w.company_name))
        .unwrap_or_default()
        .to_string();

    let work_history = person
        .work_list
        .iter()
        .map(|w| WorkEntry {
            company_name: w.company_name.clone().unwrap_or_default(),
            position: w.title().unwrap_or_default().to_string(),
            is_current: w.is_current,
            from: w.from.clone(),
            to: w.to.clone(),
            linkedin: w.linkedin.clone(),
        })
        .collect();

    let personality = data.insights.map(|insights| Personality {
        traits: insights.adjectives,
        archetypes: insights.personality_types,
    });

    Profile {
        name,
        title,
        company,
        linkedin_url: non_empty(&person.linkedin_url)
            .unwrap_or(submitted_url)
            .to_string(),
        profile_image: person.profile_pic.filter(|p| !p.is_empty()),
        work_history,
        personality,
    }
}
