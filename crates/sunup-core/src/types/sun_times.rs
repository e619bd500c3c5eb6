//! Sun event kinds and the set of computed event times for one date.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A notifiable sun event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Sunrise,
    Sunset,
    CivilTwilightBegin,
    CivilTwilightEnd,
}

impl EventKind {
    /// Notification text sent when the event happens.
    pub fn message(&self) -> &'static str {
        match self {
            EventKind::Sunrise => "The sun is rising.",
            EventKind::Sunset => "The sun is setting.",
            EventKind::CivilTwilightBegin => "Civil twilight has begun.",
            EventKind::CivilTwilightEnd => "Civil twilight has ended.",
        }
    }

    /// Notification text for an alert that fires ahead of the event.
    pub fn anticipation_message(&self, minutes: i64) -> String {
        match self {
            EventKind::Sunrise => format!("The sun is rising in {minutes} minutes."),
            EventKind::Sunset => format!("The sun is setting in {minutes} minutes."),
            EventKind::CivilTwilightBegin => format!("Civil twilight begins in {minutes} minutes."),
            EventKind::CivilTwilightEnd => format!("Civil twilight ends in {minutes} minutes."),
        }
    }

    /// Key used by the remote sun times API for this event.
    pub fn api_key(&self) -> &'static str {
        match self {
            EventKind::Sunrise => "sunrise",
            EventKind::Sunset => "sunset",
            EventKind::CivilTwilightBegin => "dawn",
            EventKind::CivilTwilightEnd => "dusk",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::Sunrise => "sunrise",
            EventKind::Sunset => "sunset",
            EventKind::CivilTwilightBegin => "civil twilight begin",
            EventKind::CivilTwilightEnd => "civil twilight end",
        };
        write!(f, "{name}")
    }
}

/// The computed event times for one calendar date, as UTC times of day.
/// Computed fresh per scheduling cycle, never cached beyond it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunEventTimes {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub civil_twilight_begin: Option<NaiveTime>,
    pub civil_twilight_end: Option<NaiveTime>,
}

impl SunEventTimes {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self {
            sunrise,
            sunset,
            civil_twilight_begin: None,
            civil_twilight_end: None,
        }
    }

    /// Time of day for `kind`, when the source reported one.
    pub fn time_of(&self, kind: EventKind) -> Option<NaiveTime> {
        match kind {
            EventKind::Sunrise => Some(self.sunrise),
            EventKind::Sunset => Some(self.sunset),
            EventKind::CivilTwilightBegin => self.civil_twilight_begin,
            EventKind::CivilTwilightEnd => self.civil_twilight_end,
        }
    }

    /// Absolute UTC instant of `kind` on `date`.
    pub fn instant(&self, kind: EventKind, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.time_of(kind).map(|t| date.and_time(t).and_utc())
    }
}
