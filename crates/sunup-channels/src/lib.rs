//! # Sunup Channels
//!
//! Outbound delivery transports. Only sending lives here — inbound
//! conversation handling belongs to the surrounding bot application.

pub mod telegram;

pub use telegram::TelegramSender;
