//! User alerts — which sun events a chat wants to hear about, and how far
//! ahead of the event.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::sun_times::{EventKind, SunEventTimes};
use crate::types::ChatId;

/// One subscription of a chat to a sun event. A zero offset fires at the
/// event itself; a negative offset fires that many minutes ahead of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAlert {
    pub chat_id: ChatId,
    pub kind: EventKind,
    pub offset_minutes: i64,
}

impl UserAlert {
    pub fn new(chat_id: ChatId, kind: EventKind, offset_minutes: i64) -> Self {
        Self {
            chat_id,
            kind,
            offset_minutes,
        }
    }

    /// The alert set every chat starts with: sunrise and sunset, at the
    /// event itself.
    pub fn defaults(chat_id: ChatId) -> Vec<UserAlert> {
        vec![
            UserAlert::new(chat_id, EventKind::Sunrise, 0),
            UserAlert::new(chat_id, EventKind::Sunset, 0),
        ]
    }

    /// Notification text for this alert.
    pub fn message(&self) -> String {
        if self.offset_minutes < 0 {
            self.kind.anticipation_message(-self.offset_minutes)
        } else {
            self.kind.message().to_string()
        }
    }

    /// Absolute UTC instant this alert should fire at on `date`, offset
    /// applied. None when the source reported no time for the event.
    pub fn instant(&self, times: &SunEventTimes, date: NaiveDate) -> Option<DateTime<Utc>> {
        times
            .instant(self.kind, date)
            .map(|i| i + Duration::minutes(self.offset_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn times() -> SunEventTimes {
        SunEventTimes::new(
            NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_defaults_cover_sunrise_and_sunset() {
        let alerts = UserAlert::defaults(42);
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.chat_id == 42 && a.offset_minutes == 0));
        assert!(alerts.iter().any(|a| a.kind == EventKind::Sunrise));
        assert!(alerts.iter().any(|a| a.kind == EventKind::Sunset));
    }

    #[test]
    fn test_offset_shifts_instant() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let alert = UserAlert::new(1, EventKind::Sunset, -15);
        let instant = alert.instant(&times(), date).unwrap();
        assert_eq!(instant.to_rfc3339(), "2026-08-07T19:45:00+00:00");
    }

    #[test]
    fn test_anticipation_message_for_negative_offset() {
        let alert = UserAlert::new(1, EventKind::Sunrise, -10);
        assert_eq!(alert.message(), "The sun is rising in 10 minutes.");

        let alert = UserAlert::new(1, EventKind::Sunrise, 0);
        assert_eq!(alert.message(), "The sun is rising.");
    }
}
