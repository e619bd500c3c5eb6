//! Data model shared across the workspace.

pub mod alert;
pub mod step;
pub mod sun_times;

pub use alert::UserAlert;
pub use step::Step;
pub use sun_times::{EventKind, SunEventTimes};

use serde::{Deserialize, Serialize};

/// Telegram-style numeric chat identifier.
pub type ChatId = i64;

/// A geographic position. Immutable per computation; supplied by the
/// persisted chat state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// The persisted per-chat record: where the user is and where the
/// conversation stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub coordinates: Coordinates,
    pub step: Step,
}

impl UserState {
    pub fn new(coordinates: Coordinates, step: Step) -> Self {
        Self { coordinates, step }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_display() {
        let c = Coordinates::new(45.07, 7.68);
        assert_eq!(c.to_string(), "(45.0700, 7.6800)");
    }

    #[test]
    fn test_user_state_roundtrip() {
        let state = UserState::new(Coordinates::new(45.07, 7.68), Step::Running);
        let json = serde_json::to_string(&state).unwrap();
        let back: UserState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
