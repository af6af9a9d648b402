use serde::{Deserialize, Serialize};

use super::Mood;

/// Whether the user is being coached or the persona is being role-played
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CoachingMode {
    #[default]
    Coaching,
    RolePlay,
}

/// Static suggestion shown next to the conversation for a mood
pub fn tip(mood: Mood, mode: CoachingMode) -> &'static str {
    match mode {
        CoachingMode::Coaching => coaching_tip(mood),
        CoachingMode::RolePlay => role_play_tip(mood),
    }
}

fn coaching_tip(mood: Mood) -> &'static str {
    match mood {
        Mood::Professional => "Maintain eye contact and speak with confidence. Use industry-specific terminology to establish credibility.",
        Mood::Friendly => "Start with a warm greeting and find common ground. Use open body language and smile genuinely.",
        Mood::Empathetic => "Listen actively and acknowledge their concerns. Use phrases like 'I understand' and 'That must be challenging.'",
        Mood::Casual => "Keep the tone relaxed and conversational. Use humor appropriately and don't be afraid to share personal experiences.",
        Mood::Humorous => "Use light humor to break the ice, but read the room. Self-deprecating jokes work better than jokes about others.",
        Mood::Direct => "Be clear and concise. State your points directly without too much preamble. Respect their time.",
        Mood::Neutral => "Maintain a balanced tone. Focus on facts and avoid emotional language. Stay objective.",
        Mood::Skeptical => "Address concerns head-on with evidence. Acknowledge their skepticism and provide concrete examples.",
        Mood::Hostile => "Stay calm and professional. Don't take things personally. Use de-escalation techniques.",
        Mood::Distracted => "Use engaging questions to recapture attention. Keep your points brief and impactful.",
        Mood::Curious => "Encourage questions and exploration. Share interesting insights and be prepared for deep dives.",
        Mood::Defensive => "Create a safe space for open dialogue. Avoid blame language and focus on solutions.",
    }
}

fn role_play_tip(mood: Mood) -> &'static str {
    match mood {
        Mood::Professional => "Be analytical and data-driven. Ask detailed questions about metrics and ROI.",
        Mood::Friendly => "Show enthusiasm about collaboration. Mention team initiatives and cross-functional projects.",
        Mood::Empathetic => "Express concern about team workload and stress. Ask about work-life balance solutions.",
        Mood::Casual => "Be informal and relaxed. Share stories about company culture and team bonding activities.",
        Mood::Humorous => "Use light workplace humor. Make jokes about common industry challenges or funny team experiences.",
        Mood::Direct => "Get straight to business. Ask tough questions about timelines, budgets, and deliverables.",
        Mood::Neutral => "Stay factual and objective. Focus on process improvements and operational efficiency.",
        Mood::Skeptical => "Question assumptions and ask for proof. Challenge proposals with 'What if...' scenarios.",
        Mood::Hostile => "Show resistance to change. Express frustration with past failed initiatives and vendor disappointments.",
        Mood::Distracted => "Act busy and multitask. Give short responses and check phone/email frequently.",
        Mood::Curious => "Ask lots of follow-up questions. Want to understand technical details and implementation steps.",
        Mood::Defensive => "Protect current processes and team decisions. Justify existing systems and approaches.",
    }
}
