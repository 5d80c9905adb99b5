//! Read-only calendar views: one day, one month, agenda.

use chrono::{Datelike, NaiveDate};
use remindcal_core::{month_grid, Clock, Config, LogSink};
use serde::Serialize;

use super::{open_store, print_json, views, CliResult, EventView};

#[derive(Serialize)]
struct DayView<'a> {
    date: NaiveDate,
    events: Vec<EventView<'a>>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}").into())
}

fn parse_month(raw: &str) -> Result<(i32, u32), Box<dyn std::error::Error>> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|e| format!("invalid month '{raw}' (expected YYYY-MM): {e}"))?;
    Ok((first.year(), first.month()))
}

/// Events on `date`, today if omitted.
pub fn day(date: Option<String>) -> CliResult {
    let config = Config::load()?;
    let store = open_store(&config, LogSink)?;
    let date = match date {
        Some(raw) => parse_date(&raw)?,
        None => store.clock().today(),
    };

    let events = store.events_on_day(date)?;
    print_json(&DayView {
        date,
        events: views(&events, store.zone()),
    })
}

/// Every day of `month` with its events, the current month if omitted.
pub fn month(month: Option<String>) -> CliResult {
    let config = Config::load()?;
    let store = open_store(&config, LogSink)?;
    let zone = store.zone();
    let (year, month) = match month {
        Some(raw) => parse_month(&raw)?,
        None => {
            let today = store.clock().today();
            (today.year(), today.month())
        }
    };

    let events = store.get_all()?;
    let grid = month_grid(&events, year, month, zone)
        .ok_or_else(|| format!("invalid month {year}-{month:02}"))?;
    let days: Vec<DayView> = grid
        .into_iter()
        .map(|cell| DayView {
            date: cell.date,
            events: views(cell.events, zone),
        })
        .collect();
    print_json(&days)
}

/// Every event sorted by start, optionally filtered.
pub fn agenda(search: Option<String>) -> CliResult {
    let config = Config::load()?;
    let store = open_store(&config, LogSink)?;
    let events = store.agenda(search.as_deref())?;
    print_json(&views(&events, store.zone()))
}
