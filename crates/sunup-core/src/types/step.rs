//! Per-chat lifecycle step and its legal transitions.
//!
//! Transitions are driven by the conversation layer; the notification
//! engine only reads the step as an eligibility predicate, re-checked at
//! every sweep.

use serde::{Deserialize, Serialize};

/// Lifecycle step of one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    NewChat,
    ToEnterLocation,
    ToReenterLocation,
    ToEnterSupportMessage,
    Running,
    Stopped,
    Expired,
}

impl Step {
    /// Only `Running` chats receive scheduled notifications.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Step::Running)
    }

    /// Legal forward transitions. Any step may be forced to `Expired` by
    /// the transport when delivery permanently fails, and an expired chat
    /// resumes `Running` on the next successful contact.
    pub fn can_transition_to(&self, next: Step) -> bool {
        use Step::*;

        if next == Expired {
            return true;
        }

        matches!(
            (self, next),
            (NewChat, ToEnterLocation)
                | (ToEnterLocation, Running)
                | (Running, Stopped)
                | (Stopped, Running)
                | (Running, ToReenterLocation)
                | (Stopped, ToReenterLocation)
                | (ToReenterLocation, ToEnterLocation)
                | (Expired, Running)
        )
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::NewChat => "NEW_CHAT",
            Step::ToEnterLocation => "TO_ENTER_LOCATION",
            Step::ToReenterLocation => "TO_REENTER_LOCATION",
            Step::ToEnterSupportMessage => "TO_ENTER_SUPPORT_MESSAGE",
            Step::Running => "RUNNING",
            Step::Stopped => "STOPPED",
            Step::Expired => "EXPIRED",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility() {
        assert!(Step::Running.is_eligible());
        assert!(!Step::Stopped.is_eligible());
        assert!(!Step::Expired.is_eligible());
        assert!(!Step::ToEnterLocation.is_eligible());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(Step::NewChat.can_transition_to(Step::ToEnterLocation));
        assert!(Step::ToEnterLocation.can_transition_to(Step::Running));
        assert!(Step::Running.can_transition_to(Step::Stopped));
        assert!(Step::Stopped.can_transition_to(Step::Running));
        assert!(Step::Running.can_transition_to(Step::ToReenterLocation));
        assert!(Step::Stopped.can_transition_to(Step::ToReenterLocation));
        assert!(Step::ToReenterLocation.can_transition_to(Step::ToEnterLocation));
    }

    #[test]
    fn test_expiry_is_always_reachable() {
        for step in [
            Step::NewChat,
            Step::ToEnterLocation,
            Step::Running,
            Step::Stopped,
        ] {
            assert!(step.can_transition_to(Step::Expired));
        }
        assert!(Step::Expired.can_transition_to(Step::Running));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!Step::NewChat.can_transition_to(Step::Running));
        assert!(!Step::Running.can_transition_to(Step::NewChat));
        assert!(!Step::Expired.can_transition_to(Step::Stopped));
    }

    #[test]
    fn test_serde_format() {
        let json = serde_json::to_string(&Step::ToEnterLocation).unwrap();
        assert_eq!(json, "\"TO_ENTER_LOCATION\"");
        let back: Step = serde_json::from_str("\"RUNNING\"").unwrap();
        assert_eq!(back, Step::Running);
    }
}
