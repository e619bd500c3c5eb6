//! # Sunup Notifier
//!
//! The notifier engine: for each running chat it computes the day's sun
//! event instants and keeps a one-shot message scheduled for every alert,
//! rolling forward to tomorrow when today's instant has already passed.
//! A recurring midnight sweep re-installs everything daily — that sweep is
//! the system's recovery mechanism after failures and restarts.

pub mod dispatch;
pub mod notifier;

pub use dispatch::NotifierDispatcher;
pub use notifier::Notifier;
