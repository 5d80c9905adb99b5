//! Integration tests for the SQLite-backed store.
//!
//! Records must survive reopening the database; timers must not, and are
//! restored with `rearm_all`.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use remindcal_core::{
    CalendarError, ChannelSink, Event, EventInput, EventRepository, EventStore, LogSink,
    ManualClock, ReminderNotification, ReminderScheduler, SqliteRepository,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tempfile::TempDir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 3, 30, 0).unwrap()
}

fn at(minutes: i64) -> String {
    (now() + Duration::minutes(minutes)).to_rfc3339()
}

fn open(dir: &TempDir, clock: Arc<ManualClock>, reminders: ReminderScheduler) -> EventStore {
    let repo = SqliteRepository::open_at(dir.path().join("remindcal.db")).unwrap();
    EventStore::new(repo, clock, reminders)
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(chrono_tz::Asia::Colombo, now()))
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let created = {
        let mut store = open(&dir, clock(), ReminderScheduler::new(LogSink));
        let a = store
            .create(&EventInput::new("Dentist", at(90)).with_describe("bring x-rays").with_reminder(30))
            .unwrap();
        let b = store.create(&EventInput::new("Gym", at(300))).unwrap();
        vec![a, b]
    };

    let store = open(&dir, clock(), ReminderScheduler::new(LogSink));
    assert_eq!(store.get_all().unwrap(), created);
    assert_eq!(store.get_by_id(created[0].id).unwrap(), created[0]);
    assert_eq!(store.reminders().pending_count(), 0);
}

#[test]
fn test_rearm_after_reopen_fires_pending_reminder() {
    let dir = TempDir::new().unwrap();
    let event = {
        let mut store = open(&dir, clock(), ReminderScheduler::new(LogSink));
        store
            .create(&EventInput::new("Dentist", at(90)).with_reminder(30))
            .unwrap()
    };

    let clock = clock();
    let (sink, mut rx) = ChannelSink::channel();
    let mut store = open(&dir, clock.clone(), ReminderScheduler::new(sink));
    assert_eq!(store.rearm_all().unwrap(), 1);

    clock.advance(Duration::minutes(60));
    assert_eq!(store.fire_due_reminders().len(), 1);
    assert_eq!(rx.try_recv().unwrap().event_id, event.id);
}

#[test]
fn test_update_and_delete_persist() {
    let dir = TempDir::new().unwrap();
    let id = {
        let mut store = open(&dir, clock(), ReminderScheduler::new(LogSink));
        let event = store
            .create(&EventInput::new("Dentist", at(90)).with_reminder(30))
            .unwrap();
        store
            .update(event.id, &EventInput::new("Orthodontist", at(120)))
            .unwrap();
        event.id
    };

    let mut store = open(&dir, clock(), ReminderScheduler::new(LogSink));
    let stored = store.get_by_id(id).unwrap();
    assert_eq!(stored.title, "Orthodontist");
    assert_eq!(stored.reminder, None);

    store.delete(id).unwrap();
    drop(store);

    let store = open(&dir, clock(), ReminderScheduler::new(LogSink));
    assert!(matches!(store.get_by_id(id), Err(CalendarError::NotFound(_))));
    assert!(store.get_all().unwrap().is_empty());
}

/// A watching store with one pending reminder, plus a second handle on the
/// same database file standing in for another CLI invocation.
fn watched(
    dir: &TempDir,
) -> (EventStore, Arc<ManualClock>, UnboundedReceiver<ReminderNotification>, SqliteRepository, Event) {
    let clock = clock();
    let (sink, rx) = ChannelSink::channel();
    let mut store = open(dir, clock.clone(), ReminderScheduler::new(sink));
    let event = store
        .create(&EventInput::new("Dentist", at(90)).with_reminder(30))
        .unwrap();
    let other = SqliteRepository::open_at(dir.path().join("remindcal.db")).unwrap();
    (store, clock, rx, other, event)
}

#[test]
fn test_rescan_cancels_removed_reminder() {
    let dir = TempDir::new().unwrap();
    let (mut store, clock, mut rx, mut other, event) = watched(&dir);

    let changed = Event {
        reminder: None,
        ..event.clone()
    };
    assert!(other.replace(&changed).unwrap());

    assert_eq!(store.rearm_all().unwrap(), 0);
    clock.advance(Duration::hours(2));
    assert!(store.fire_due_reminders().is_empty());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_rescan_cancels_reminder_moved_into_past() {
    let dir = TempDir::new().unwrap();
    let (mut store, clock, mut rx, mut other, event) = watched(&dir);

    // fire_at becomes now - 30m; the old timer at now + 60m must not survive
    let changed = Event {
        title: "Moved".into(),
        reminder: Some(120),
        ..event.clone()
    };
    other.replace(&changed).unwrap();

    assert_eq!(store.rearm_all().unwrap(), 0);
    clock.advance(Duration::hours(2));
    assert!(store.fire_due_reminders().is_empty());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_rescan_refreshes_changed_title_and_start() {
    let dir = TempDir::new().unwrap();
    let (mut store, clock, mut rx, mut other, event) = watched(&dir);

    let changed = Event {
        title: "Orthodontist".into(),
        start: event.start + Duration::minutes(30),
        end: event.end + Duration::minutes(30),
        ..event.clone()
    };
    other.replace(&changed).unwrap();

    assert_eq!(store.rearm_all().unwrap(), 1);
    assert_eq!(store.reminders().fire_at(event.id), changed.fire_at());

    clock.advance(Duration::minutes(60));
    assert!(store.fire_due_reminders().is_empty());
    clock.advance(Duration::minutes(30));
    assert_eq!(store.fire_due_reminders().len(), 1);

    let note = rx.try_recv().unwrap();
    assert_eq!(note.title, "Orthodontist");
    assert_eq!(note.start, changed.start);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_rescan_forgets_rows_deleted_elsewhere() {
    let dir = TempDir::new().unwrap();
    let (mut store, clock, mut rx, mut other, event) = watched(&dir);

    assert!(other.remove(event.id).unwrap().is_some());
    assert_eq!(store.rearm_all().unwrap(), 0);

    clock.advance(Duration::hours(2));
    assert!(store.fire_due_reminders().is_empty());
    assert!(rx.try_recv().is_err());
}
