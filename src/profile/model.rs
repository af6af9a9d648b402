use serde::{Deserialize, Serialize};

/// Person being role-played or coached against.
///
/// Produced once by the profile lookup and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub company: String,
    pub linkedin_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub work_history: Vec<WorkEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<Personality>,
}

impl Profile {
    /// LinkedIn URL to open a session with, if the profile has one
    pub fn session_url(&self) -> Option<&str> {
        Some(self.linkedin_url.trim()).filter(|url| !url.is_empty())
    }

    /// First word of the name; used to recognise coach lines in edited notes
    pub fn first_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }

    /// Personality insights, falling back to a generic sales persona
    pub fn personality_or_default(&self) -> Personality {
        self.personality.clone().unwrap_or_else(Personality::fallback)
    }
}

/// One position from the profile's work history, passed through as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkEntry {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub traits: Vec<String>,
    pub archetypes: Vec<String>,
}

impl Personality {
    pub fn fallback() -> Self {
        let traits = [
            "Driven",
            "Analytical",
            "Outgoing",
            "Organized",
            "Adaptable",
            "Enthusiastic",
            "Pragmatic",
            "Considerate",
            "Resilient",
            "Intellectual",
        ];
        let archetypes = [
            "The Achiever",
            "The Organized Leader",
            "The Analytical Extrovert",
        ];

        Self {
            traits: traits.iter().map(|t| t.to_string()).collect(),
            archetypes: archetypes.iter().map(|a| a.to_string()).collect(),
        }
    }
}
