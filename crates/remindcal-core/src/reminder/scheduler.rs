//! Per-event reminder timers.
//!
//! The scheduler is a deadline table, not a thread. It never sleeps: the
//! caller (normally [`super::ReminderDriver`]) asks for [`next_deadline`] and
//! calls [`fire_due`] once that instant has passed.
//!
//! ## State Transitions
//!
//! ```text
//! Unarmed -> Armed -> Fired
//!              |
//!              +----> Cancelled
//! ```
//!
//! [`next_deadline`]: ReminderScheduler::next_deadline
//! [`fire_due`]: ReminderScheduler::fire_due

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use super::sink::{NotificationSink, ReminderNotification};
use crate::event::{Event, EventId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderState {
    Unarmed,
    Armed,
    Fired,
    Cancelled,
}

/// What `arm` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// A timer is pending for `fire_at`.
    Armed { fire_at: DateTime<Utc> },
    /// The event has no reminder.
    NoReminder,
    /// `fire_at` was not after `now`; nothing scheduled.
    PastDue { fire_at: DateTime<Utc> },
    /// Reminders are switched off for this scheduler.
    Disabled,
}

/// Running totals, mostly for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub armed: u64,
    pub skipped_past_due: u64,
    pub cancelled: u64,
    pub fired: u64,
    pub failed_deliveries: u64,
}

#[derive(Debug, Clone)]
struct PendingReminder {
    fire_at: DateTime<Utc>,
    notification: ReminderNotification,
}

/// Owns one pending timer per event id.
pub struct ReminderScheduler {
    pending: HashMap<EventId, PendingReminder>,
    states: HashMap<EventId, ReminderState>,
    sink: Box<dyn NotificationSink>,
    wake: Arc<Notify>,
    enabled: bool,
    stats: SchedulerStats,
}

impl ReminderScheduler {
    pub fn new(sink: impl NotificationSink + 'static) -> Self {
        Self {
            pending: HashMap::new(),
            states: HashMap::new(),
            sink: Box::new(sink),
            wake: Arc::new(Notify::new()),
            enabled: true,
            stats: SchedulerStats::default(),
        }
    }

    /// A scheduler that accepts every call but never arms a timer.
    pub fn disabled(sink: impl NotificationSink + 'static) -> Self {
        Self {
            enabled: false,
            ..Self::new(sink)
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self, id: EventId) -> ReminderState {
        self.states.get(&id).copied().unwrap_or(ReminderState::Unarmed)
    }

    /// When the pending timer for `id` fires, if one is pending.
    pub fn fire_at(&self, id: EventId) -> Option<DateTime<Utc>> {
        self.pending.get(&id).map(|p| p.fire_at)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Ids with a pending timer, in no particular order.
    pub fn pending_ids(&self) -> Vec<EventId> {
        self.pending.keys().copied().collect()
    }

    /// Ids with any recorded state, pending or not.
    pub fn tracked_ids(&self) -> Vec<EventId> {
        self.states.keys().copied().collect()
    }

    /// Whether the pending timer for `event.id` was armed from exactly this
    /// data: same deadline, same notification payload.
    pub fn is_current(&self, event: &Event) -> bool {
        match self.pending.get(&event.id) {
            Some(p) => {
                Some(p.fire_at) == event.fire_at()
                    && Some(&p.notification) == ReminderNotification::for_event(event).as_ref()
            }
            None => false,
        }
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.values().map(|p| p.fire_at).min()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Signalled whenever the deadline table changes.
    pub fn waker(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Schedule a timer at `event.start - event.reminder`.
    ///
    /// A timer already pending for the same id is replaced, so there is never
    /// more than one per event.
    pub fn arm(&mut self, event: &Event, now: DateTime<Utc>) -> ArmOutcome {
        if !self.enabled {
            return ArmOutcome::Disabled;
        }
        let (Some(fire_at), Some(notification)) =
            (event.fire_at(), ReminderNotification::for_event(event))
        else {
            return ArmOutcome::NoReminder;
        };

        if fire_at <= now {
            self.stats.skipped_past_due += 1;
            tracing::warn!(
                event_id = %event.id,
                fire_at = %fire_at.to_rfc3339(),
                "reminder already past due, not scheduled"
            );
            return ArmOutcome::PastDue { fire_at };
        }

        self.pending.insert(
            event.id,
            PendingReminder {
                fire_at,
                notification,
            },
        );
        self.states.insert(event.id, ReminderState::Armed);
        self.stats.armed += 1;
        tracing::debug!(event_id = %event.id, fire_at = %fire_at.to_rfc3339(), "reminder armed");
        self.wake.notify_one();
        ArmOutcome::Armed { fire_at }
    }

    /// Cancel whatever is pending for `event.id`, then arm from current data.
    pub fn reschedule(&mut self, event: &Event, now: DateTime<Utc>) -> ArmOutcome {
        self.cancel(event.id);
        self.arm(event, now)
    }

    /// Drop the pending timer for `id`. Returns whether one was pending.
    ///
    /// Idempotent: a second call finds nothing and changes nothing.
    pub fn cancel(&mut self, id: EventId) -> bool {
        if self.pending.remove(&id).is_none() {
            return false;
        }
        self.states.insert(id, ReminderState::Cancelled);
        self.stats.cancelled += 1;
        tracing::debug!(event_id = %id, "reminder cancelled");
        self.wake.notify_one();
        true
    }

    /// Cancel anything pending for `id` and drop its recorded state, so
    /// `state(id)` reads `Unarmed` again. Used once the event itself is gone.
    pub fn forget(&mut self, id: EventId) {
        self.cancel(id);
        self.states.remove(&id);
    }

    /// Fire every timer due at `now`, earliest first.
    ///
    /// Each fired timer is removed before its notification is delivered, and
    /// is marked `Fired` even when delivery fails.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Vec<ReminderNotification> {
        let mut due: Vec<(DateTime<Utc>, EventId)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.fire_at <= now)
            .map(|(id, p)| (p.fire_at, *id))
            .collect();
        due.sort();

        let mut fired = Vec::with_capacity(due.len());
        for (_, id) in due {
            let Some(pending) = self.pending.remove(&id) else {
                continue;
            };
            self.states.insert(id, ReminderState::Fired);
            self.stats.fired += 1;

            if let Err(e) = self.sink.notify(&pending.notification) {
                self.stats.failed_deliveries += 1;
                tracing::warn!(event_id = %id, error = %e, "reminder delivery failed");
            } else {
                tracing::info!(event_id = %id, title = %pending.notification.title, "reminder fired");
            }
            fired.push(pending.notification);
        }
        fired
    }

    /// Cancel every pending timer. Returns how many were pending.
    pub fn shutdown(&mut self) -> usize {
        let ids = self.pending_ids();
        for id in &ids {
            self.cancel(*id);
        }
        if !ids.is_empty() {
            tracing::info!(cancelled = ids.len(), "reminder scheduler shut down");
        }
        ids.len()
    }
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("pending", &self.pending.len())
            .field("enabled", &self.enabled)
            .field("stats", &self.stats)
            .finish()
    }
}
