use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Persona the backend adopts for the coached conversation.
///
/// Changing the mood never touches a running session; it is read when the
/// next session is created.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mood {
    Friendly,
    #[default]
    Professional,
    Casual,
    Empathetic,
    Humorous,
    Direct,
    Neutral,
    Skeptical,
    Hostile,
    Distracted,
    Curious,
    Defensive,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
