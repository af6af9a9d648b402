use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const USER_LABEL: &str = "You";
const COACH_LABEL: &str = "Coach";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Coach,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => USER_LABEL,
            Speaker::Coach => COACH_LABEL,
        }
    }
}

/// A single line of the live conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// `You: ...` / `Coach: ...`
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.text)
    }
}

/// How one line of the notes renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TranscriptLine {
    User { text: String },
    Coach { label: String, text: String },
    Note { text: String },
}

/// Append-only conversation record plus its free-text rendering.
///
/// `turns` only ever grows. The text log starts as the `You:`/`Coach:`
/// rendering of those turns but may be overwritten by the user, after
/// which the two no longer agree; new turns keep being appended to both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
    log: String,
    edited: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.log = format!("{}\n{}", self.log, turn.to_line()).trim().to_string();
        self.turns.push(turn);
    }

    /// Replace the notes with user-edited text
    pub fn edit(&mut self, text: impl Into<String>) {
        self.log = text.into();
        self.edited = true;
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn text(&self) -> &str {
        &self.log
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Classify each line of the notes. Coach lines start with `Coach:` or
    /// with `coach_name:` (the profile's first name).
    pub fn lines(&self, coach_name: Option<&str>) -> Vec<TranscriptLine> {
        self.log
            .lines()
            .map(|line| classify(line, coach_name))
            .collect()
    }
}

fn classify(line: &str, coach_name: Option<&str>) -> TranscriptLine {
    if let Some(rest) = strip_label(line, USER_LABEL) {
        return TranscriptLine::User {
            text: rest.trim_start().to_string(),
        };
    }

    let labels = coach_name
        .into_iter()
        .filter(|name| !name.is_empty())
        .chain(std::iter::once(COACH_LABEL));
    for label in labels {
        if let Some(rest) = strip_label(line, label) {
            return TranscriptLine::Coach {
                label: label.to_string(),
                text: rest.trim_start().to_string(),
            };
        }
    }

    TranscriptLine::Note {
        text: line.to_string(),
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.strip_prefix(label)?.strip_prefix(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_builds_prefixed_log() {
        let mut transcript = Transcript::new();
        transcript.append(ConversationTurn::new(Speaker::User, "Hello"));
        transcript.append(ConversationTurn::new(Speaker::Coach, "Hi there"));

        assert_eq!(transcript.text(), "You: Hello\nCoach: Hi there");
        assert_eq!(transcript.turns().len(), 2);
        assert!(!transcript.is_edited());
    }

    #[test]
    fn edits_detach_log_but_turns_keep_growing() {
        let mut transcript = Transcript::new();
        transcript.append(ConversationTurn::new(Speaker::User, "Hello"));
        transcript.edit("my own notes");
        transcript.append(ConversationTurn::new(Speaker::Coach, "Welcome"));

        assert!(transcript.is_edited());
        assert_eq!(transcript.text(), "my own notes\nCoach: Welcome");
        assert_eq!(transcript.turns().len(), 2);
        assert_eq!(transcript.turns()[0].text, "Hello");
    }

    #[test]
    fn lines_classify_prefixes() {
        let mut transcript = Transcript::new();
        transcript.edit("You: pitch\nSarah: not interested\nCoach: try again\nremember budget");

        let lines = transcript.lines(Some("Sarah"));
        assert_eq!(
            lines,
            vec![
                TranscriptLine::User {
                    text: "pitch".to_string()
                },
                TranscriptLine::Coach {
                    label: "Sarah".to_string(),
                    text: "not interested".to_string()
                },
                TranscriptLine::Coach {
                    label: "Coach".to_string(),
                    text: "try again".to_string()
                },
                TranscriptLine::Note {
                    text: "remember budget".to_string()
                },
            ]
        );

        // Without a coach name only the generic label counts
        assert!(matches!(
            transcript.lines(None)[1],
            TranscriptLine::Note { .. }
        ));
    }

    #[test]
    fn empty_transcript_has_no_lines() {
        assert!(Transcript::new().lines(None).is_empty());
        assert!(Transcript::new().is_empty());
    }
}
