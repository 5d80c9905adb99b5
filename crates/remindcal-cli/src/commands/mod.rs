pub mod calendar;
pub mod config;
pub mod event;
pub mod watch;

use std::sync::Arc;

use chrono_tz::Tz;
use remindcal_core::{
    Config, Event, EventId, EventStore, NotificationSink, ReminderScheduler, SqliteRepository,
    SystemClock,
};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store described by `config`, delivering reminders to `sink`.
pub fn open_store(
    config: &Config,
    sink: impl NotificationSink + 'static,
) -> Result<EventStore, Box<dyn std::error::Error>> {
    let zone = config.zone()?;
    let repo = SqliteRepository::open_at(config.database_path()?)?;
    let reminders = if config.reminders.enabled {
        ReminderScheduler::new(sink)
    } else {
        ReminderScheduler::disabled(sink)
    };
    Ok(EventStore::new(repo, Arc::new(SystemClock::new(zone)), reminders))
}

/// An event as printed: instants in the reference zone.
#[derive(Debug, Serialize)]
pub struct EventView<'a> {
    pub id: EventId,
    pub title: &'a str,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub describe: Option<&'a str>,
    pub reminder: Option<u32>,
}

impl<'a> EventView<'a> {
    pub fn new(event: &'a Event, zone: Tz) -> Self {
        Self {
            id: event.id,
            title: &event.title,
            start: event.start_in(zone).to_rfc3339(),
            end: event.end_in(zone).to_rfc3339(),
            describe: event.describe.as_deref(),
            reminder: event.reminder,
        }
    }
}

pub fn views<'a, I>(events: I, zone: Tz) -> Vec<EventView<'a>>
where
    I: IntoIterator<Item = &'a Event>,
{
    events.into_iter().map(|e| EventView::new(e, zone)).collect()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
