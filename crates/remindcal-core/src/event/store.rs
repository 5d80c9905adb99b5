//! The event store: validated CRUD with reminder bookkeeping.
//!
//! Every successful mutation updates the reminder scheduler inside the same
//! `&mut self` call, so no caller can see a saved event whose timer state
//! lags behind. Validation and persistence run first; the scheduler step is
//! infallible, so a failed write never touches timers.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::model::{Event, EventId, EventInput};
use super::validate::validate;
use crate::calendar;
use crate::clock::Clock;
use crate::error::{CalendarError, Result};
use crate::reminder::{ReminderNotification, ReminderScheduler};
use crate::storage::{EventRepository, MemoryRepository};

pub struct EventStore {
    repo: Box<dyn EventRepository>,
    clock: Arc<dyn Clock>,
    reminders: ReminderScheduler,
}

impl EventStore {
    pub fn new(
        repo: impl EventRepository + 'static,
        clock: Arc<dyn Clock>,
        reminders: ReminderScheduler,
    ) -> Self {
        Self {
            repo: Box::new(repo),
            clock,
            reminders,
        }
    }

    /// Store backed by [`MemoryRepository`].
    pub fn in_memory(clock: Arc<dyn Clock>, reminders: ReminderScheduler) -> Self {
        Self::new(MemoryRepository::new(), clock, reminders)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn zone(&self) -> Tz {
        self.clock.zone()
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    /// All events in insertion order.
    pub fn get_all(&self) -> Result<Vec<Event>> {
        Ok(self.repo.list()?)
    }

    pub fn get_by_id(&self, id: EventId) -> Result<Event> {
        self.repo.get(id)?.ok_or(CalendarError::NotFound(id))
    }

    /// Events intersecting the local date `day`.
    pub fn events_on_day(&self, day: NaiveDate) -> Result<Vec<Event>> {
        let events = self.repo.list()?;
        Ok(calendar::events_on_day(&events, day, self.zone())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Every event sorted by start, optionally filtered by `search`.
    pub fn agenda(&self, search: Option<&str>) -> Result<Vec<Event>> {
        let events = self.repo.list()?;
        Ok(calendar::agenda(&events, search).into_iter().cloned().collect())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate `input`, persist it under a fresh id, and arm its reminder.
    pub fn create(&mut self, input: &EventInput) -> Result<Event> {
        let fields = validate(input, self.clock.as_ref())?;
        let event = Event::from_validated(EventId::new(), fields);
        self.repo.insert(&event)?;

        let outcome = self.reminders.arm(&event, self.clock.now_utc());
        tracing::info!(event_id = %event.id, title = %event.title, ?outcome, "event created");
        Ok(event)
    }

    /// Replace every mutable field of `id` with `input`, re-validating as if
    /// the event were new, then reschedule its reminder.
    ///
    /// Fields absent from `input` are absent in the result; this is not a patch.
    pub fn update(&mut self, id: EventId, input: &EventInput) -> Result<Event> {
        if self.repo.get(id)?.is_none() {
            return Err(CalendarError::NotFound(id));
        }
        let fields = validate(input, self.clock.as_ref())?;
        let event = Event::from_validated(id, fields);
        if !self.repo.replace(&event)? {
            return Err(CalendarError::NotFound(id));
        }

        let outcome = self.reminders.reschedule(&event, self.clock.now_utc());
        tracing::info!(event_id = %event.id, ?outcome, "event updated");
        Ok(event)
    }

    /// Remove `id` and cancel its pending reminder.
    pub fn delete(&mut self, id: EventId) -> Result<Event> {
        let event = self.repo.remove(id)?.ok_or(CalendarError::NotFound(id))?;
        let cancelled = self.reminders.cancel(id);
        self.reminders.forget(id);
        tracing::info!(event_id = %id, reminder_cancelled = cancelled, "event deleted");
        Ok(event)
    }

    /// Bring the timer table in line with the stored events.
    ///
    /// Timers live in memory only, so a fresh process calls this once at
    /// startup; a long-lived one may call it again to pick up writes made by
    /// other processes. A pending timer armed from exactly the stored data is
    /// kept, even when already due. Any other timer is replaced from the
    /// stored row, or cancelled when the row has no future reminder. Ids no
    /// longer stored are forgotten. Returns how many timers are pending
    /// afterwards.
    pub fn rearm_all(&mut self) -> Result<usize> {
        let now = self.clock.now_utc();
        let events = self.repo.list()?;

        let live: HashSet<EventId> = events.iter().map(|e| e.id).collect();
        for id in self.reminders.tracked_ids() {
            if !live.contains(&id) {
                self.reminders.forget(id);
            }
        }

        for event in &events {
            if self.reminders.is_current(event) {
                continue;
            }
            match event.fire_at() {
                Some(fire_at) if fire_at > now => {
                    self.reminders.reschedule(event, now);
                }
                _ => {
                    self.reminders.cancel(event.id);
                }
            }
        }

        let pending = self.reminders.pending_count();
        tracing::debug!(pending, "reminders re-armed from store");
        Ok(pending)
    }

    /// Fire every reminder due at the clock's current instant.
    pub fn fire_due_reminders(&mut self) -> Vec<ReminderNotification> {
        let now = self.clock.now_utc();
        self.reminders.fire_due(now)
    }

    /// Cancel every pending reminder. Returns how many were pending.
    pub fn shutdown_reminders(&mut self) -> usize {
        self.reminders.shutdown()
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("zone", &self.zone())
            .field("reminders", &self.reminders)
            .finish_non_exhaustive()
    }
}
