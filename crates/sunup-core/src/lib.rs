//! # Sunup Core
//!
//! Shared foundation for the sunup workspace: the data model (coordinates,
//! lifecycle steps, sun event times, alerts), the unified error type, the
//! configuration system, the clock abstraction, and the collaborator traits
//! every other crate wires against.

pub mod clock;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SunupConfig;
pub use error::{Result, SunupError};
pub use traits::{ChatStateStore, MessageDelivery, SunTimesService};
pub use types::{ChatId, Coordinates, EventKind, Step, SunEventTimes, UserAlert, UserState};
