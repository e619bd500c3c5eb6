//! The notifier engine.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveTime};

use sunup_core::{
    ChatId, ChatStateStore, Clock, Coordinates, Result, SunEventTimes, SunTimesService, SunupError,
    UserAlert,
};
use sunup_scheduler::{RetryPolicy, ScheduleResult, Scheduler, TaskKind};

/// Ensures every eligible chat has its next sun event notifications
/// scheduled, tolerating an unavailable time source and instants that
/// have already elapsed.
pub struct Notifier {
    store: Arc<dyn ChatStateStore>,
    sun_times: Arc<dyn SunTimesService>,
    scheduler: Arc<Scheduler>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    reinstall_period: Duration,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn ChatStateStore>,
        sun_times: Arc<dyn SunTimesService>,
        scheduler: Arc<Scheduler>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
        reinstall_period: Duration,
    ) -> Self {
        Self {
            store,
            sun_times,
            scheduler,
            clock,
            retry,
            reinstall_period,
        }
    }

    /// Schedule today's notifications for one chat. Transient service
    /// failures propagate unretried — `try_to_install_notifier` owns the
    /// retry loop.
    pub async fn install_notifier(&self, chat_id: ChatId) -> Result<()> {
        let coordinates = self.store.coordinates(chat_id)?;
        let today = self.clock.now().date_naive();
        let times = self.sun_times.sun_event_times(coordinates, today).await?;

        // Deferred: fetching tomorrow is a second remote call, only paid
        // when some alert's instant has already passed today.
        let mut tomorrow: Option<SunEventTimes> = None;

        for alert in self.alerts_for(chat_id) {
            tomorrow = self
                .schedule_alert(&alert, coordinates, today, &times, tomorrow)
                .await?;
        }
        Ok(())
    }

    /// The alerts to schedule for a chat. Sunrise and sunset for
    /// everyone; per-chat alert management arrives with the conversation
    /// layer.
    fn alerts_for(&self, chat_id: ChatId) -> Vec<UserAlert> {
        UserAlert::defaults(chat_id)
    }

    /// Try today's instant; when it is already gone, compute tomorrow's
    /// times (at most once per install, shared across alerts) and try
    /// those. Returns the possibly-initialized tomorrow cache.
    async fn schedule_alert(
        &self,
        alert: &UserAlert,
        coordinates: Coordinates,
        today: NaiveDate,
        times: &SunEventTimes,
        mut tomorrow: Option<SunEventTimes>,
    ) -> Result<Option<SunEventTimes>> {
        let kind = TaskKind::Event(alert.kind);

        let Some(fire_at) = alert.instant(times, today) else {
            tracing::warn!("No {} time reported for chat {}", alert.kind, alert.chat_id);
            return Ok(tomorrow);
        };

        let result = self
            .scheduler
            .schedule_once(alert.chat_id, fire_at, kind, alert.message())
            .await?;
        if result != ScheduleResult::NotScheduled {
            // Scheduled, or declined because already booked: either way
            // there is nothing to roll forward.
            return Ok(tomorrow);
        }

        let next_day = today + Days::new(1);
        if tomorrow.is_none() {
            tomorrow = Some(
                self.sun_times
                    .sun_event_times(coordinates, next_day)
                    .await?,
            );
        }

        let fire_at_tomorrow = tomorrow
            .as_ref()
            .and_then(|times| alert.instant(times, next_day));
        let Some(fire_at_tomorrow) = fire_at_tomorrow else {
            tracing::warn!("No {} time reported for chat {}", alert.kind, alert.chat_id);
            return Ok(tomorrow);
        };

        let result = self
            .scheduler
            .schedule_once(alert.chat_id, fire_at_tomorrow, kind, alert.message())
            .await?;
        if !result.is_scheduled() && result != ScheduleResult::NotToSchedule {
            tracing::warn!(
                "{} for chat {} not scheduled even for [{fire_at_tomorrow}]",
                alert.kind,
                alert.chat_id
            );
        }

        Ok(tomorrow)
    }

    /// Retry wrapper around `install_notifier`: bounded attempts with a
    /// fixed pause, then `InstallFailed`. If the service stays down for
    /// the whole budget, today's notifications for this chat are
    /// abandoned; the daily sweep retries tomorrow.
    pub async fn try_to_install_notifier(&self, chat_id: ChatId) -> Result<()> {
        let result = self
            .retry
            .run("install notifier", || self.install_notifier(chat_id))
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_transient() => Err(SunupError::InstallFailed {
                chat_id,
                attempts: self.retry.max_attempts(),
            }),
            Err(e) => Err(e),
        }
    }

    /// One sweep: install notifiers for every chat currently in the
    /// running step. Failures are isolated per chat. Returns how many
    /// chats were installed successfully.
    pub async fn install_all_notifiers(&self) -> usize {
        let chats = self.store.eligible_chats();
        tracing::info!("Installing notifiers for {} running chat(s)", chats.len());

        let results = futures::future::join_all(chats.into_iter().map(|(chat_id, _)| async move {
            match self.try_to_install_notifier(chat_id).await {
                Ok(()) => true,
                Err(e) => {
                    let error_id = uuid::Uuid::new_v4();
                    tracing::error!("Skipping chat {chat_id} this sweep: {e} ({error_id})");
                    false
                }
            }
        }))
        .await;

        results.into_iter().filter(|installed| *installed).count()
    }

    /// Register the daily reinstall sweep: anchored at the next UTC
    /// midnight, recurring every reinstall period.
    pub async fn register_daily_reinstall(&self) -> Result<()> {
        let first = (self.clock.now().date_naive() + Days::new(1))
            .and_time(NaiveTime::MIN)
            .and_utc();
        self.scheduler
            .schedule_recurring(TaskKind::DailyReinstall, first, self.reinstall_period)
            .await?;
        Ok(())
    }
}
