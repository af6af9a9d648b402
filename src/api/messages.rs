use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::Mood;

/// Opaque identifier issued by the backend for one live session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// POST {live_base}/sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub linkedin_url: String,
    pub mood: Mood,
}

/// POST {live_base}/chat
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub message: String,
}

/// POST {live_base}/scores and POST {live_base}/summary
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionArtifactRequest {
    pub session_id: SessionId,
}

/// POST {rag_api}
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeQuery {
    pub query: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Contextual tips keyed off the latest coach reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Post-session performance scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    #[serde(rename = "scorecard")]
    pub items: Vec<ScoreItem>,
    pub session_id: SessionId,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub total_score: f64,
    pub max_possible_score: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreItem {
    pub category: String,
    /// 0..=10, where 0 means the skill was not demonstrated
    pub score: f64,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub suggestions: String,
}

/// Maximum score of a single scorecard item
pub const MAX_ITEM_SCORE: f64 = 10.0;

/// Display band for a scorecard item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    #[strum(serialize = "Not Demonstrated")]
    NotDemonstrated,
    Excellent,
    Good,
    Fair,
    #[strum(serialize = "Needs Work")]
    NeedsWork,
}

impl ScoreItem {
    pub fn band(&self) -> ScoreBand {
        if self.score <= 0.0 {
            return ScoreBand::NotDemonstrated;
        }
        let percentage = self.score / MAX_ITEM_SCORE * 100.0;
        if percentage >= 80.0 {
            ScoreBand::Excellent
        } else if percentage >= 60.0 {
            ScoreBand::Good
        } else if percentage >= 40.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::NeedsWork
        }
    }
}

/// Narrative post-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "summary")]
    pub report: SummaryReport,
    pub session_id: SessionId,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryReport {
    pub scenario_context: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub pitch_delivery: Vec<String>,
    #[serde(rename = "objectionsRaisedAndHandling")]
    pub objections: Vec<Objection>,
    pub notable_moments: Vec<String>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objection {
    pub objection: String,
    pub handling: String,
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_session_request_uses_wire_names() {
        let req = CreateSessionRequest {
            linkedin_url: "https://www.linkedin.com/in/jane".to_string(),
            mood: Mood::Skeptical,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["linkedin_url"], "https://www.linkedin.com/in/jane");
        assert_eq!(json["mood"], "skeptical");
    }

    #[test]
    fn chat_request_serializes_plain_session_id() {
        let req = ChatRequest {
            session_id: SessionId::from("abc"),
            message: "Hello".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"session_id":"abc","message":"Hello"}"#
        );
    }

    #[test]
    fn scorecard_deserialization() {
        let json = r#"{
            "scorecard": [
                {"category": "Rapport", "score": 8, "rating": "Strong", "comments": "Warm opener", "suggestions": "Keep it up"},
                {"category": "Closing", "score": 0, "rating": "", "comments": "", "suggestions": "Ask for next step"}
            ],
            "session_id": "abc",
            "timestamp": "2025-10-27T14:30:00Z",
            "total_score": 8,
            "max_possible_score": 20,
            "percentage": 40.0
        }"#;

        let card: Scorecard = serde_json::from_str(json).unwrap();
        assert_eq!(card.items.len(), 2);
        assert_eq!(card.session_id.as_str(), "abc");
        assert_eq!(card.items[0].band(), ScoreBand::Excellent);
        assert_eq!(card.items[1].band(), ScoreBand::NotDemonstrated);
        assert_eq!(card.percentage, 40.0);
    }

    #[test]
    fn score_bands() {
        let item = |score: f64| ScoreItem {
            category: "x".to_string(),
            score,
            rating: String::new(),
            comments: String::new(),
            suggestions: String::new(),
        };
        assert_eq!(item(6.0).band(), ScoreBand::Good);
        assert_eq!(item(4.0).band(), ScoreBand::Fair);
        assert_eq!(item(3.0).band(), ScoreBand::NeedsWork);
        assert_eq!(ScoreBand::NotDemonstrated.to_string(), "Not Demonstrated");
    }

    #[test]
    fn summary_deserialization_tolerates_missing_sections() {
        let json = r#"{
            "summary": {
                "scenarioContext": "Cold call to a VP of Sales",
                "strengths": ["Clear value prop"],
                "objectionsRaisedAndHandling": [
                    {"objection": "Too expensive", "handling": "Reframed ROI", "suggestion": "Use a case study"}
                ]
            },
            "session_id": "abc"
        }"#;

        let summary: Summary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.report.scenario_context, "Cold call to a VP of Sales");
        assert_eq!(summary.report.strengths, vec!["Clear value prop"]);
        assert!(summary.report.next_steps.is_empty());
        assert_eq!(summary.report.objections[0].objection, "Too expensive");
        assert_eq!(summary.timestamp, None);
    }

    #[test]
    fn knowledge_answer_without_sources() {
        let answer: KnowledgeAnswer =
            serde_json::from_str(r#"{"answer": "Ask about budget"}"#).unwrap();
        assert!(answer.sources.is_empty());
    }

    #[test]
    fn blank_session_id_is_empty() {
        assert!(SessionId::new("  ").is_empty());
        assert!(!SessionId::new("S1").is_empty());
    }
}
