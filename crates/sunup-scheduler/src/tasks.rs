//! Task definitions — the core data model for scheduled work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sunup_core::{ChatId, EventKind};

/// Outcome of a schedule attempt. A closed set, not a boolean: callers
/// must tell "too late, try tomorrow" (`NotScheduled`) apart from
/// "declined, already pending" (`NotToSchedule`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleResult {
    Scheduled,
    NotScheduled,
    NotToSchedule,
}

impl ScheduleResult {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleResult::Scheduled)
    }
}

/// What a pending task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Deliver a sun event message to a chat.
    Event(EventKind),
    /// Run the full notifier reinstall sweep.
    DailyReinstall,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Event(kind) => write!(f, "{kind} message"),
            TaskKind::DailyReinstall => write!(f, "daily reinstall"),
        }
    }
}

/// How often a task fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    /// Fire once, then discard.
    Once,
    /// Re-fire every `period_secs`.
    Every { period_secs: u64 },
}

/// A scheduled unit of work. Owned exclusively by the scheduler from
/// registration until it fires or is cancelled; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTask {
    /// Unique task ID.
    pub id: String,
    /// Target chat; absent for engine-internal tasks.
    pub chat_id: Option<ChatId>,
    pub kind: TaskKind,
    /// Absolute UTC instant to fire at (or after).
    pub fire_at: DateTime<Utc>,
    /// Message text for delivery tasks.
    pub payload: Option<String>,
    pub recurrence: Recurrence,
}

impl PendingTask {
    /// Create a one-shot delivery task.
    pub fn once(
        chat_id: ChatId,
        kind: TaskKind,
        fire_at: DateTime<Utc>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: Some(chat_id),
            kind,
            fire_at,
            payload: Some(payload.into()),
            recurrence: Recurrence::Once,
        }
    }

    /// Create a recurring task.
    pub fn recurring(kind: TaskKind, first_fire_at: DateTime<Utc>, period_secs: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: None,
            kind,
            fire_at: first_fire_at,
            payload: None,
            recurrence: Recurrence::Every { period_secs },
        }
    }

    /// Check if this task is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.fire_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_due() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let task = PendingTask::once(
            1,
            TaskKind::Event(EventKind::Sunset),
            now + Duration::minutes(5),
            "The sun is setting.",
        );
        assert!(!task.is_due(now));
        assert!(task.is_due(now + Duration::minutes(5)));
        assert!(task.is_due(now + Duration::hours(1)));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            TaskKind::Event(EventKind::Sunrise).to_string(),
            "sunrise message"
        );
        assert_eq!(TaskKind::DailyReinstall.to_string(), "daily reinstall");
    }

    #[test]
    fn test_unique_ids() {
        let a = PendingTask::recurring(TaskKind::DailyReinstall, Utc::now(), 60);
        let b = PendingTask::recurring(TaskKind::DailyReinstall, Utc::now(), 60);
        assert_ne!(a.id, b.id);
    }
}
