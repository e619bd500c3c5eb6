//! # Sunup Scheduler
//!
//! In-memory one-shot and recurring task scheduling for the notification
//! engine. Tokio timers only — zero overhead when idle.
//!
//! Pending tasks are deliberately ephemeral: a process restart loses them
//! all, and the daily reinstall sweep rebuilds them. That sweep, not timer
//! persistence, is the system's recovery mechanism (at-least-once,
//! best-effort delivery).
//!
//! ## Architecture
//! ```text
//! Scheduler (tokio interval)
//!   ├── one-shot: sunrise / sunset message at a UTC instant
//!   ├── recurring: daily reinstall sweep, anchored at UTC midnight
//!   └── on fire → TaskDispatcher → delivery / sweep
//! ```

pub mod engine;
pub mod retry;
pub mod tasks;

pub use engine::{Scheduler, TaskDispatcher, spawn};
pub use retry::RetryPolicy;
pub use tasks::{PendingTask, Recurrence, ScheduleResult, TaskKind};
