//! Event management commands for CLI.

use clap::{Args, Subcommand};
use remindcal_core::{CalendarError, Config, EventId, EventInput, Field, FieldErrors, LogSink};

use super::{open_store, print_json, views, CliResult, EventView};

/// Every mutable field of an event. Used whole by both add and update.
#[derive(Args)]
pub struct EventFields {
    /// Start: RFC 3339, or "YYYY-MM-DD HH:MM" in the configured zone
    #[arg(long)]
    start: Option<String>,
    /// End; defaults to 24 hours after start
    #[arg(long)]
    end: Option<String>,
    /// Free-form description
    #[arg(long)]
    describe: Option<String>,
    /// Minutes before start to fire a reminder
    #[arg(long, allow_hyphen_values = true)]
    reminder: Option<i64>,
}

impl EventFields {
    fn into_input(self, title: Option<String>) -> EventInput {
        EventInput {
            title,
            start: self.start,
            end: self.end,
            describe: self.describe,
            reminder: self.reminder,
        }
    }
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Create an event
    Add {
        /// Event title
        title: String,
        #[command(flatten)]
        fields: EventFields,
    },
    /// List every event in creation order
    List,
    /// Show one event
    Show {
        /// Event ID
        id: String,
    },
    /// Replace an event. Fields not given are cleared.
    Update {
        /// Event ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: EventFields,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: String,
    },
}

/// A malformed id is bad input, reported like any other field error.
fn parse_id(raw: &str) -> Result<EventId, CalendarError> {
    raw.parse::<EventId>().map_err(|e| {
        FieldErrors::single(Field::Id, format!("invalid event id '{raw}': {e}")).into()
    })
}

pub fn run(action: EventAction) -> CliResult {
    let config = Config::load()?;
    let mut store = open_store(&config, LogSink)?;
    let zone = store.zone();

    match action {
        EventAction::Add { title, fields } => {
            let event = store.create(&fields.into_input(Some(title)))?;
            print_json(&EventView::new(&event, zone))?;
        }
        EventAction::List => {
            let events = store.get_all()?;
            print_json(&views(&events, zone))?;
        }
        EventAction::Show { id } => {
            let event = store.get_by_id(parse_id(&id)?)?;
            print_json(&EventView::new(&event, zone))?;
        }
        EventAction::Update { id, title, fields } => {
            let event = store.update(parse_id(&id)?, &fields.into_input(title))?;
            print_json(&EventView::new(&event, zone))?;
        }
        EventAction::Delete { id } => {
            let event = store.delete(parse_id(&id)?)?;
            println!("Event deleted: {}", event.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_an_id_field_error() {
        match parse_id("not-a-uuid") {
            Err(CalendarError::ValidationFailed(errors)) => {
                assert!(errors.get(Field::Id).unwrap().contains("invalid event id"));
            }
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
        assert!(parse_id("6f1c2b8e-3a4d-4c5e-9f60-7a8b9c0d1e2f").is_ok());
    }
}
