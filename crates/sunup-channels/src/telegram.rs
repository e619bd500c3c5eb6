//! Telegram delivery — message sending via the Bot API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use sunup_core::config::TelegramConfig;
use sunup_core::{ChatId, MessageDelivery, Result, SunupError};

/// Telegram Bot API sender.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{}",
            self.config.bot_token, method
        )
    }

    /// Send a text message.
    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| SunupError::delivery(format!("sendMessage failed: {e}")))?;

        let result: TelegramApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| SunupError::delivery(format!("invalid send response: {e}")))?;

        if result.ok {
            Ok(())
        } else {
            Err(classify_send_error(
                chat_id,
                result.error_code,
                result.description,
            ))
        }
    }

    /// Get bot info; used to validate the token at startup.
    pub async fn get_me(&self) -> Result<TelegramUser> {
        let response = self
            .client
            .get(self.api_url("getMe"))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| SunupError::delivery(format!("getMe failed: {e}")))?;

        let body: TelegramApiResponse<TelegramUser> = response
            .json()
            .await
            .map_err(|e| SunupError::delivery(format!("invalid getMe response: {e}")))?;

        body.result
            .ok_or_else(|| SunupError::delivery("no bot info"))
    }
}

/// A 403 means the user blocked the bot or the bot was kicked, and a 400
/// "chat not found" means the chat is gone: both are permanent, the chat
/// is reported unreachable so the lifecycle layer can expire it. Anything
/// else may clear up and stays transient.
fn classify_send_error(
    chat_id: ChatId,
    error_code: Option<i64>,
    description: Option<String>,
) -> SunupError {
    let description = description.unwrap_or_default();
    let permanent = match error_code {
        Some(403) => true,
        Some(400) => description.to_lowercase().contains("chat not found"),
        _ => false,
    };

    if permanent {
        tracing::warn!("Chat {chat_id} unreachable: {description}");
        SunupError::ChatUnreachable(chat_id)
    } else {
        SunupError::delivery(format!(
            "Telegram API error {}: {description}",
            error_code.unwrap_or_default()
        ))
    }
}

#[async_trait]
impl MessageDelivery for TelegramSender {
    async fn deliver(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await?;
        tracing::info!("✅ Message delivered to chat {chat_id}");
        Ok(())
    }
}

// --- Telegram API Types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}
