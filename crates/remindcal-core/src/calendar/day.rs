//! Day-overlap query.
//!
//! An event is on a day when it starts that day, ends that day, or covers the
//! whole day. Instants are converted to local dates in the reference zone
//! before comparing, so a late-evening UTC instant lands on the right local
//! date.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::event::Event;

/// Does `event` intersect the local calendar date `day`?
pub fn is_on_day(event: &Event, day: NaiveDate, zone: Tz) -> bool {
    let start_day = event.start_in(zone).date_naive();
    let end_day = event.end_in(zone).date_naive();

    // Whole-day span: started before `day` began and ends after it is over.
    start_day == day || end_day == day || (start_day < day && end_day > day)
}

/// Every event that intersects `day`, in input order.
pub fn events_on_day<'a>(events: &'a [Event], day: NaiveDate, zone: Tz) -> Vec<&'a Event> {
    events.iter().filter(|e| is_on_day(e, day, zone)).collect()
}

/// One cell of the month grid.
#[derive(Debug, Clone, Serialize)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a Event>,
}

/// Every date of `year`-`month` with the events on it.
///
/// Returns `None` for an invalid month.
pub fn month_grid<'a>(events: &'a [Event], year: i32, month: u32, zone: Tz) -> Option<Vec<DayCell<'a>>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let cells = first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| DayCell {
            date,
            events: events_on_day(events, date, zone),
        })
        .collect();
    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const ZONE: Tz = chrono_tz::Asia::Colombo;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        ZONE.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn event(start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: EventId::new(),
            title: "e".into(),
            start,
            end,
            describe: None,
            reminder: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn overnight_event_is_on_both_days_only() {
        let e = event(local(2026, 11, 2, 23, 0), local(2026, 11, 3, 2, 0));
        assert!(!is_on_day(&e, date(2026, 11, 1), ZONE));
        assert!(is_on_day(&e, date(2026, 11, 2), ZONE));
        assert!(is_on_day(&e, date(2026, 11, 3), ZONE));
        assert!(!is_on_day(&e, date(2026, 11, 4), ZONE));
    }

    #[test]
    fn multi_day_event_covers_middle_days() {
        let e = event(local(2026, 11, 2, 9, 0), local(2026, 11, 5, 9, 0));
        for d in 2..=5 {
            assert!(is_on_day(&e, date(2026, 11, d), ZONE), "day {d}");
        }
        assert!(!is_on_day(&e, date(2026, 11, 6), ZONE));
    }

    #[test]
    fn dates_come_from_reference_zone_not_utc() {
        // 00:30 local on the 3rd is still the 2nd in UTC.
        let start = local(2026, 11, 3, 0, 30);
        assert_eq!(start.date_naive(), date(2026, 11, 2));
        let e = event(start, start + Duration::hours(1));
        assert!(is_on_day(&e, date(2026, 11, 3), ZONE));
        assert!(!is_on_day(&e, date(2026, 11, 2), ZONE));
    }

    #[test]
    fn month_grid_has_one_cell_per_day() {
        let e = event(local(2026, 2, 27, 10, 0), local(2026, 3, 1, 10, 0));
        let events = vec![e];
        let grid = month_grid(&events, 2026, 2, ZONE).unwrap();
        assert_eq!(grid.len(), 28);
        assert_eq!(grid[26].events.len(), 1);
        assert_eq!(grid[27].events.len(), 1);
        assert!(grid[25].events.is_empty());
        assert!(month_grid(&events, 2026, 13, ZONE).is_none());
    }
}
