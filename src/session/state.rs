use serde::Serialize;
use std::fmt;

use crate::api::SessionId;
use crate::error::CoachError;

/// Coarse lifecycle stage, as shown to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Idle,
    Starting,
    Listening,
    Stopping,
}

/// Lifecycle state of the coaching session.
///
/// The session identifier lives inside the states that have one, so
/// "listening without a session" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    /// Create-session request in flight; `attempt` tags the request so a
    /// late response for an abandoned attempt is recognised
    Starting { attempt: u64 },
    Listening { session_id: SessionId },
    /// Capture teardown in progress
    Stopping { session_id: SessionId },
}

impl LifecycleState {
    pub fn stage(&self) -> Stage {
        match self {
            LifecycleState::Idle => Stage::Idle,
            LifecycleState::Starting { .. } => Stage::Starting,
            LifecycleState::Listening { .. } => Stage::Listening,
            LifecycleState::Stopping { .. } => Stage::Stopping,
        }
    }

    /// Authoritative identifier, present only while Listening or Stopping
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            LifecycleState::Listening { session_id } | LifecycleState::Stopping { session_id } => {
                Some(session_id)
            }
            _ => None,
        }
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, LifecycleState::Listening { .. })
    }

    /// Whether `id` is the session currently listening
    pub fn is_listening_to(&self, id: &SessionId) -> bool {
        matches!(self, LifecycleState::Listening { session_id } if session_id == id)
    }

    /// Move to `next` if the transition table allows it.
    ///
    /// | from      | to                          |
    /// |-----------|-----------------------------|
    /// | Idle      | Starting                    |
    /// | Starting  | Listening, Idle             |
    /// | Listening | Stopping, Idle              |
    /// | Stopping  | Idle                        |
    ///
    /// Any state may fall back to Idle.
    pub fn transition(
        &mut self,
        next: LifecycleState,
        action: &'static str,
    ) -> Result<(), CoachError> {
        let allowed = matches!(
            (self.stage(), next.stage()),
            (_, Stage::Idle)
                | (Stage::Idle, Stage::Starting)
                | (Stage::Starting, Stage::Listening)
                | (Stage::Listening, Stage::Stopping)
        );

        if !allowed {
            return Err(CoachError::InvalidTransition {
                from: self.stage().to_string(),
                action,
            });
        }

        *self = next;
        Ok(())
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.session_id() {
            Some(id) => write!(f, "{} ({})", self.stage(), id),
            None => write!(f, "{}", self.stage()),
        }
    }
}
