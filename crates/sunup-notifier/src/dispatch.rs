//! Fired-task dispatch — the bridge from the scheduler's firing loop to
//! delivery and to the daily sweep.

use std::sync::Arc;

use async_trait::async_trait;

use sunup_core::{ChatStateStore, MessageDelivery, Step, SunupError};
use sunup_scheduler::{PendingTask, TaskDispatcher, TaskKind};

use crate::notifier::Notifier;

/// Routes fired tasks: event messages go out through the delivery
/// transport, the reinstall task runs the sweep.
///
/// Delivery is attempted for whatever was scheduled — eligibility is only
/// re-checked by the sweep, so a chat that stopped after scheduling still
/// receives its in-flight notification.
pub struct NotifierDispatcher {
    notifier: Arc<Notifier>,
    delivery: Arc<dyn MessageDelivery>,
    store: Arc<dyn ChatStateStore>,
}

impl NotifierDispatcher {
    pub fn new(
        notifier: Arc<Notifier>,
        delivery: Arc<dyn MessageDelivery>,
        store: Arc<dyn ChatStateStore>,
    ) -> Self {
        Self {
            notifier,
            delivery,
            store,
        }
    }
}

#[async_trait]
impl TaskDispatcher for NotifierDispatcher {
    async fn dispatch(&self, task: PendingTask) {
        match task.kind {
            TaskKind::DailyReinstall => {
                tracing::info!("🌅 Daily reinstall sweep starting");
                let installed = self.notifier.install_all_notifiers().await;
                tracing::info!("Daily reinstall sweep done ({installed} chat(s) installed)");
            }
            TaskKind::Event(kind) => {
                let Some(chat_id) = task.chat_id else {
                    tracing::warn!("Dropping {kind} task without a chat id");
                    return;
                };
                let text = task
                    .payload
                    .unwrap_or_else(|| kind.message().to_string());

                match self.delivery.deliver(chat_id, &text).await {
                    Ok(()) => {}
                    Err(SunupError::ChatUnreachable(_)) => {
                        tracing::error!("Chat {chat_id} unreachable. Chat flagged as expired.");
                        self.store.set_step(chat_id, Step::Expired);
                    }
                    Err(e) => {
                        tracing::error!("Failed to deliver {kind} to chat {chat_id}: {e}");
                    }
                }
            }
        }
    }
}
