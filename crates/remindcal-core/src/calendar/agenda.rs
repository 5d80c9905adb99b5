use crate::event::Event;

/// All events sorted by start (then title), optionally narrowed by `search`.
///
/// The search is a case-insensitive substring match against `title` or
/// `describe`. A blank search matches everything.
pub fn agenda<'a>(events: &'a [Event], search: Option<&str>) -> Vec<&'a Event> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut rows: Vec<&Event> = events
        .iter()
        .filter(|e| match &needle {
            Some(needle) => matches_search(e, needle),
            None => true,
        })
        .collect();
    rows.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
    rows
}

fn matches_search(event: &Event, needle: &str) -> bool {
    event.title.to_lowercase().contains(needle)
        || event
            .describe
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;
    use chrono::{Duration, TimeZone, Utc};

    fn event(title: &str, describe: Option<&str>, hours_from_base: i64) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap() + Duration::hours(hours_from_base);
        Event {
            id: EventId::new(),
            title: title.into(),
            start,
            end: start + Duration::hours(1),
            describe: describe.map(Into::into),
            reminder: None,
        }
    }

    #[test]
    fn sorted_by_start() {
        let events = vec![event("late", None, 5), event("early", None, 1)];
        let titles: Vec<_> = agenda(&events, None).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
    }

    #[test]
    fn search_matches_title_or_description_ignoring_case() {
        let events = vec![
            event("Budget review", None, 1),
            event("Lunch", Some("discuss BUDGET numbers"), 2),
            event("Gym", Some("legs"), 3),
        ];
        let hits: Vec<_> = agenda(&events, Some("budget")).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(hits, vec!["Budget review", "Lunch"]);
    }

    #[test]
    fn blank_search_returns_everything() {
        let events = vec![event("a", None, 1), event("b", None, 2)];
        assert_eq!(agenda(&events, Some("   ")).len(), 2);
    }
}
