//! Collaborator seams. Every external dependency of the notification
//! engine sits behind one of these traits and is handed in at
//! construction time — no ambient registry.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{ChatId, Coordinates, Step, SunEventTimes, UserState};

/// Remote source of sun event times for a position and date.
/// Failures are transient (`SunupError::Service`) and retried by callers.
#[async_trait]
pub trait SunTimesService: Send + Sync {
    async fn sun_event_times(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<SunEventTimes>;
}

/// Outbound message transport.
/// A permanent failure surfaces as `SunupError::ChatUnreachable` so the
/// lifecycle layer can expire the chat; anything else is transient.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<()>;
}

/// Persisted per-chat state. Read-mostly from the engine's point of view;
/// the only write it performs is flagging a chat expired on permanent
/// delivery failure.
pub trait ChatStateStore: Send + Sync {
    /// Chats in the `Running` step, with their coordinates. Evaluated
    /// fresh on every call — eligibility is never cached.
    fn eligible_chats(&self) -> Vec<(ChatId, Coordinates)>;

    fn state(&self, chat_id: ChatId) -> Option<UserState>;

    /// Coordinates of a known chat, `ChatNotFound` otherwise.
    fn coordinates(&self, chat_id: ChatId) -> Result<Coordinates>;

    fn set_state(&self, chat_id: ChatId, state: UserState);

    /// Updates only the lifecycle step; no-op for unknown chats.
    fn set_step(&self, chat_id: ChatId, step: Step);
}
