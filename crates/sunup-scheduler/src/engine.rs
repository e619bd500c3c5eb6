//! Scheduler engine — holds the pending task set and drives the firing
//! loop. Registration may happen concurrently from many install workers;
//! a single background loop fires due tasks. The task set lock is never
//! held across dispatch I/O.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use sunup_core::{ChatId, Clock, Result, SunupError};

use crate::tasks::{PendingTask, Recurrence, ScheduleResult, TaskKind};

/// Receives tasks as they fire.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    async fn dispatch(&self, task: PendingTask);
}

struct SchedulerState {
    tasks: Vec<PendingTask>,
    closed: bool,
}

impl SchedulerState {
    /// An identical one-shot already pending for this chat, kind and
    /// instant. Keeps a repeated sweep from double-booking the same event.
    fn already_scheduled(&self, chat_id: ChatId, kind: TaskKind, fire_at: DateTime<Utc>) -> bool {
        self.tasks.iter().any(|t| {
            t.recurrence == Recurrence::Once
                && t.chat_id == Some(chat_id)
                && t.kind == kind
                && t.fire_at == fire_at
        })
    }
}

/// The scheduler — a mutable collection of pending tasks, fired exactly
/// once each at or after their instant.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(SchedulerState {
                tasks: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Register a one-shot task.
    ///
    /// Returns `NotScheduled` when `fire_at` is not strictly in the
    /// future, `NotToSchedule` when an identical task is already pending,
    /// and fails with `SchedulerClosed` after shutdown.
    pub async fn schedule_once(
        &self,
        chat_id: ChatId,
        fire_at: DateTime<Utc>,
        kind: TaskKind,
        payload: impl Into<String> + Send,
    ) -> Result<ScheduleResult> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;

        if state.closed {
            return Err(SunupError::SchedulerClosed);
        }

        if state.already_scheduled(chat_id, kind, fire_at) {
            tracing::info!("A {kind} for chat {chat_id} is already scheduled at [{fire_at}]");
            return Ok(ScheduleResult::NotToSchedule);
        }

        if fire_at <= now {
            tracing::info!("{kind} for chat {chat_id} NOT scheduled at [{fire_at}] (instant has passed)");
            return Ok(ScheduleResult::NotScheduled);
        }

        tracing::info!("📅 {kind} for chat {chat_id} scheduled at [{fire_at}]");
        state.tasks.push(PendingTask::once(chat_id, kind, fire_at, payload));
        Ok(ScheduleResult::Scheduled)
    }

    /// Register a recurring task. A `first_fire_at` in the past is rolled
    /// forward by whole periods until strictly in the future, so a
    /// recurring job always has a well-defined next fire time regardless
    /// of downtime.
    pub async fn schedule_recurring(
        &self,
        kind: TaskKind,
        first_fire_at: DateTime<Utc>,
        period: Duration,
    ) -> Result<ScheduleResult> {
        let period_secs = period.as_secs();
        if period_secs == 0 {
            tracing::warn!("Refusing to register {kind} with a zero period");
            return Ok(ScheduleResult::NotScheduled);
        }

        let now = self.clock.now();
        let mut fire_at = first_fire_at;
        if fire_at <= now {
            let behind = (now - fire_at).num_seconds();
            let periods = behind / period_secs as i64 + 1;
            fire_at = fire_at + chrono::Duration::seconds(periods * period_secs as i64);
        }

        let mut state = self.state.lock().await;
        if state.closed {
            return Err(SunupError::SchedulerClosed);
        }

        tracing::info!("📅 {kind} scheduled at [{fire_at}], every {period_secs} seconds");
        state
            .tasks
            .push(PendingTask::recurring(kind, fire_at, period_secs));
        Ok(ScheduleResult::Scheduled)
    }

    /// Remove a task if still pending. No-op once it has fired.
    pub async fn cancel(&self, task_id: &str) -> bool {
        let mut state = self.state.lock().await;
        let len = state.tasks.len();
        state.tasks.retain(|t| t.id != task_id);
        state.tasks.len() < len
    }

    /// Snapshot of the pending task set.
    pub async fn pending(&self) -> Vec<PendingTask> {
        self.state.lock().await.tasks.clone()
    }

    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.tasks.len()
    }

    /// Stop accepting registrations and drop all pending tasks. The
    /// firing loop exits on its next tick.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.tasks.clear();
        tracing::info!("Scheduler closed");
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Drain due tasks: one-shots are removed, recurring tasks are cloned
    /// out and advanced to their next period. Called by the firing loop.
    pub async fn tick(&self) -> Vec<PendingTask> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;

        let mut fired = Vec::new();
        let mut remaining = Vec::with_capacity(state.tasks.len());
        for mut task in state.tasks.drain(..) {
            if !task.is_due(now) {
                remaining.push(task);
                continue;
            }

            tracing::info!("🔔 Firing {} (chat {:?})", task.kind, task.chat_id);
            match task.recurrence {
                Recurrence::Once => fired.push(task),
                Recurrence::Every { period_secs } => {
                    fired.push(task.clone());
                    let period = chrono::Duration::seconds(period_secs as i64);
                    let mut next = task.fire_at + period;
                    // Skip whole missed periods after a long stall.
                    while next <= now {
                        next = next + period;
                    }
                    task.fire_at = next;
                    remaining.push(task);
                }
            }
        }
        state.tasks = remaining;
        fired
    }
}

/// Spawn the firing loop as a background tokio task. Due tasks are
/// collected under the lock, then dispatched after it is released.
pub fn spawn(
    scheduler: Arc<Scheduler>,
    dispatcher: Arc<dyn TaskDispatcher>,
    tick_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("⏰ Scheduler started (tick every {:?})", tick_interval);
        let mut interval = tokio::time::interval(tick_interval);

        loop {
            interval.tick().await;

            if scheduler.is_closed().await {
                break;
            }

            let due = scheduler.tick().await;
            for task in due {
                dispatcher.dispatch(task).await;
            }
        }

        tracing::info!("Scheduler loop stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sunup_core::{EventKind, ManualClock};

    fn setup() -> (Arc<ManualClock>, Scheduler) {
        let start = Utc.with_ymd_and_hms(2026, 8, 7, 8, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let scheduler = Scheduler::new(clock.clone());
        (clock, scheduler)
    }

    fn sunset() -> TaskKind {
        TaskKind::Event(EventKind::Sunset)
    }

    #[tokio::test]
    async fn test_past_instant_not_scheduled() {
        let (clock, scheduler) = setup();
        let now = clock.now();

        for fire_at in [now - chrono::Duration::minutes(1), now] {
            let result = scheduler
                .schedule_once(1, fire_at, sunset(), "late")
                .await
                .unwrap();
            assert_eq!(result, ScheduleResult::NotScheduled);
        }
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_future_instant_fires_exactly_once() {
        let (clock, scheduler) = setup();
        let fire_at = clock.now() + chrono::Duration::hours(12);

        let result = scheduler
            .schedule_once(1, fire_at, sunset(), "The sun is setting.")
            .await
            .unwrap();
        assert_eq!(result, ScheduleResult::Scheduled);

        assert!(scheduler.tick().await.is_empty());

        clock.advance(chrono::Duration::hours(12) + chrono::Duration::seconds(1));
        let fired = scheduler.tick().await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].chat_id, Some(1));
        assert_eq!(fired[0].payload.as_deref(), Some("The sun is setting."));

        assert!(scheduler.tick().await.is_empty());
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_is_not_to_schedule() {
        let (clock, scheduler) = setup();
        let fire_at = clock.now() + chrono::Duration::hours(1);

        let first = scheduler
            .schedule_once(1, fire_at, sunset(), "msg")
            .await
            .unwrap();
        let second = scheduler
            .schedule_once(1, fire_at, sunset(), "msg")
            .await
            .unwrap();
        assert_eq!(first, ScheduleResult::Scheduled);
        assert_eq!(second, ScheduleResult::NotToSchedule);
        assert_eq!(scheduler.pending_count().await, 1);

        // Same instant, different kind or chat: both legitimate.
        let other_kind = scheduler
            .schedule_once(1, fire_at, TaskKind::Event(EventKind::Sunrise), "msg")
            .await
            .unwrap();
        let other_chat = scheduler
            .schedule_once(2, fire_at, sunset(), "msg")
            .await
            .unwrap();
        assert_eq!(other_kind, ScheduleResult::Scheduled);
        assert_eq!(other_chat, ScheduleResult::Scheduled);
    }

    #[tokio::test]
    async fn test_closed_scheduler_rejects() {
        let (clock, scheduler) = setup();
        scheduler.close().await;

        let result = scheduler
            .schedule_once(1, clock.now() + chrono::Duration::hours(1), sunset(), "msg")
            .await;
        assert!(matches!(result, Err(SunupError::SchedulerClosed)));

        let result = scheduler
            .schedule_recurring(
                TaskKind::DailyReinstall,
                clock.now() + chrono::Duration::hours(1),
                Duration::from_secs(60),
            )
            .await;
        assert!(matches!(result, Err(SunupError::SchedulerClosed)));
    }

    #[tokio::test]
    async fn test_cancel() {
        let (clock, scheduler) = setup();
        scheduler
            .schedule_once(1, clock.now() + chrono::Duration::hours(1), sunset(), "msg")
            .await
            .unwrap();

        let id = scheduler.pending().await[0].id.clone();
        assert!(scheduler.cancel(&id).await);
        assert!(!scheduler.cancel(&id).await);
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_recurring_stale_anchor_rolls_forward() {
        let (clock, scheduler) = setup();
        let period = Duration::from_secs(86_400);
        let anchor = clock.now() - chrono::Duration::days(10);

        scheduler
            .schedule_recurring(TaskKind::DailyReinstall, anchor, period)
            .await
            .unwrap();

        let pending = scheduler.pending().await;
        let task = &pending[0];
        assert!(task.fire_at > clock.now());
        // Congruent mod period to the original anchor.
        let diff = (task.fire_at - anchor).num_seconds();
        assert_eq!(diff % 86_400, 0);
        // And no further in the future than one period.
        assert!(task.fire_at <= clock.now() + chrono::Duration::seconds(86_400));
    }

    #[tokio::test]
    async fn test_recurring_fires_and_advances() {
        let (clock, scheduler) = setup();
        let first = clock.now() + chrono::Duration::minutes(1);
        scheduler
            .schedule_recurring(TaskKind::DailyReinstall, first, Duration::from_secs(3600))
            .await
            .unwrap();

        clock.advance(chrono::Duration::minutes(2));
        let fired = scheduler.tick().await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, TaskKind::DailyReinstall);

        // Still pending, advanced by one period.
        let pending = scheduler.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fire_at, first + chrono::Duration::hours(1));

        assert!(scheduler.tick().await.is_empty());
    }
}
