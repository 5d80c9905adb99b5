use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, immutable event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A stored, validated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub describe: Option<String>,
    /// Minutes before `start` at which the reminder fires.
    #[serde(default)]
    pub reminder: Option<u32>,
}

impl Event {
    /// Build an event from validated fields under a fresh id.
    pub fn from_validated(id: EventId, fields: ValidatedEvent) -> Self {
        Self {
            id,
            title: fields.title,
            start: fields.start,
            end: fields.end,
            describe: fields.describe,
            reminder: fields.reminder,
        }
    }

    /// The instant the reminder is due, if the event has one.
    pub fn fire_at(&self) -> Option<DateTime<Utc>> {
        self.reminder
            .map(|minutes| self.start - Duration::minutes(i64::from(minutes)))
    }

    pub fn start_in(&self, zone: Tz) -> DateTime<Tz> {
        self.start.with_timezone(&zone)
    }

    pub fn end_in(&self, zone: Tz) -> DateTime<Tz> {
        self.end.with_timezone(&zone)
    }

    /// Full payload that reproduces this event's current fields on update.
    pub fn to_input(&self) -> EventInput {
        EventInput {
            title: Some(self.title.clone()),
            start: Some(self.start.to_rfc3339()),
            end: Some(self.end.to_rfc3339()),
            describe: self.describe.clone(),
            reminder: self.reminder.map(i64::from),
        }
    }
}

/// Raw caller payload for create and update.
///
/// Update treats this as the complete new value of every mutable field: a
/// field left as `None` is absent, not "keep the old value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub title: Option<String>,
    /// RFC 3339 instant, or a naive `YYYY-MM-DD HH:MM` in the reference zone.
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub describe: Option<String>,
    #[serde(default)]
    pub reminder: Option<i64>,
}

impl EventInput {
    pub fn new(title: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            start: Some(start.into()),
            ..Self::default()
        }
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn with_describe(mut self, describe: impl Into<String>) -> Self {
        self.describe = Some(describe.into());
        self
    }

    pub fn with_reminder(mut self, minutes: i64) -> Self {
        self.reminder = Some(minutes);
        self
    }
}

/// Fields that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub describe: Option<String>,
    pub reminder: Option<u32>,
}
