//! Field invariants checked before the store accepts a write.
//!
//! [`validate`] never short-circuits: every violated rule adds one message to
//! the returned [`FieldErrors`], keyed by field.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::model::{EventInput, ValidatedEvent};
use crate::clock::Clock;
use crate::error::{Field, FieldErrors};

pub const MSG_TITLE_REQUIRED: &str = "Please write a title for your event";
pub const MSG_START_REQUIRED: &str = "Please insert the start of your event";
pub const MSG_START_IN_PAST: &str = "start must not be in the past";
pub const MSG_END_TOO_EARLY: &str = "Event end must be at least one hour after the event start";
pub const MSG_REMINDER_NEGATIVE: &str = "reminder must be a non-negative number of minutes";

/// Minimum distance between `start` and `end`.
pub fn min_duration() -> Duration {
    Duration::hours(1)
}

/// Length of an event whose `end` was omitted.
pub fn default_duration() -> Duration {
    Duration::hours(24)
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse an instant given either as RFC 3339 or as a naive local time in `zone`.
///
/// A naive time inside a DST gap is rejected. One inside a DST overlap
/// resolves to the earlier instant.
pub fn parse_instant(raw: &str, zone: Tz) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("'{raw}' is not a valid date and time"))?;

    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(format!("'{raw}' does not exist in time zone {zone}")),
    }
}

/// Check `input` against every field rule, using `clock` for "now".
pub fn validate(input: &EventInput, clock: &dyn Clock) -> Result<ValidatedEvent, FieldErrors> {
    let zone = clock.zone();
    let mut errors = FieldErrors::new();

    let title = match input.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Some(t.to_string()),
        _ => {
            errors.add(Field::Title, MSG_TITLE_REQUIRED);
            None
        }
    };

    let start = match input.start.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match parse_instant(raw, zone) {
            Ok(start) if start < clock.now_utc() => {
                errors.add(Field::Start, MSG_START_IN_PAST);
                Some(start)
            }
            Ok(start) => Some(start),
            Err(msg) => {
                errors.add(Field::Start, msg);
                None
            }
        },
        _ => {
            errors.add(Field::Start, MSG_START_REQUIRED);
            None
        }
    };

    let end = match input.end.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => match parse_instant(raw, zone) {
            Ok(end) => {
                if let Some(start) = start {
                    if end < start + min_duration() {
                        errors.add(Field::End, MSG_END_TOO_EARLY);
                    }
                }
                Some(end)
            }
            Err(msg) => {
                errors.add(Field::End, msg);
                None
            }
        },
        None => start.map(|s| s + default_duration()),
    };

    let reminder = match input.reminder {
        None => None,
        Some(minutes) if minutes < 0 => {
            errors.add(Field::Reminder, MSG_REMINDER_NEGATIVE);
            None
        }
        Some(minutes) => match u32::try_from(minutes) {
            Ok(m) => Some(m),
            Err(_) => {
                errors.add(Field::Reminder, format!("reminder of {minutes} minutes is too large"));
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    match (title, start, end) {
        (Some(title), Some(start), Some(end)) => Ok(ValidatedEvent {
            title,
            start,
            end,
            describe: input.describe.clone(),
            reminder,
        }),
        // Every None above recorded an error, so this arm is unreachable in
        // practice; report it as a missing start rather than panicking.
        _ => Err(FieldErrors::single(Field::Start, MSG_START_REQUIRED)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn clock() -> ManualClock {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 6, 0, 0).unwrap();
        ManualClock::new(chrono_tz::Asia::Colombo, now)
    }

    #[test]
    fn omitted_end_defaults_to_one_day() {
        let clock = clock();
        let start = clock.now_utc() + Duration::hours(2);
        let input = EventInput::new("Trip", start.to_rfc3339());
        let valid = validate(&input, &clock).unwrap();
        assert_eq!(valid.end, start + Duration::hours(24));
    }

    #[test]
    fn title_is_trimmed_and_required() {
        let clock = clock();
        let start = (clock.now_utc() + Duration::hours(2)).to_rfc3339();
        let err = validate(&EventInput::new("   ", start.clone()), &clock).unwrap_err();
        assert_eq!(err.get(Field::Title), Some(MSG_TITLE_REQUIRED));

        let ok = validate(&EventInput::new("  Lunch ", start), &clock).unwrap();
        assert_eq!(ok.title, "Lunch");
    }

    #[test]
    fn all_field_errors_are_collected() {
        let clock = clock();
        let input = EventInput {
            title: None,
            start: Some((clock.now_utc() - Duration::hours(1)).to_rfc3339()),
            end: Some((clock.now_utc() - Duration::minutes(30)).to_rfc3339()),
            describe: None,
            reminder: Some(-5),
        };
        let err = validate(&input, &clock).unwrap_err();
        assert!(err.contains(Field::Title));
        assert_eq!(err.get(Field::Start), Some(MSG_START_IN_PAST));
        assert_eq!(err.get(Field::End), Some(MSG_END_TOO_EARLY));
        assert_eq!(err.get(Field::Reminder), Some(MSG_REMINDER_NEGATIVE));
    }

    #[test]
    fn end_exactly_one_hour_after_start_is_accepted() {
        let clock = clock();
        let start = clock.now_utc() + Duration::hours(1);
        let input = EventInput::new("Call", start.to_rfc3339())
            .with_end((start + Duration::hours(1)).to_rfc3339());
        assert!(validate(&input, &clock).is_ok());

        let input = EventInput::new("Call", start.to_rfc3339())
            .with_end((start + Duration::minutes(59)).to_rfc3339());
        assert!(validate(&input, &clock).is_err());
    }

    #[test]
    fn start_equal_to_now_is_accepted() {
        let clock = clock();
        let input = EventInput::new("Now", clock.now_utc().to_rfc3339());
        assert!(validate(&input, &clock).is_ok());
    }

    #[test]
    fn unparseable_start_is_a_start_error() {
        let clock = clock();
        let err = validate(&EventInput::new("x", "tomorrow-ish"), &clock).unwrap_err();
        assert!(err.get(Field::Start).unwrap().contains("not a valid date"));
    }

    #[test]
    fn naive_times_are_read_in_reference_zone() {
        let parsed = parse_instant("2026-10-19 09:00", chrono_tz::Asia::Colombo).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 19, 3, 30, 0).unwrap());
    }

    #[test]
    fn naive_time_in_dst_gap_is_rejected() {
        // Clocks in New York jump from 02:00 to 03:00 on 2026-03-08.
        let err = parse_instant("2026-03-08 02:30", chrono_tz::America::New_York).unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn zero_minute_reminder_is_kept() {
        let clock = clock();
        let input = EventInput::new("Zero", (clock.now_utc() + Duration::hours(3)).to_rfc3339())
            .with_reminder(0);
        assert_eq!(validate(&input, &clock).unwrap().reminder, Some(0));
    }
}
