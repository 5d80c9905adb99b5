//! Where fired reminders go.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::event::{Event, EventId};

/// Payload emitted when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotification {
    pub event_id: EventId,
    pub title: String,
    /// Minutes before `start`.
    pub reminder: u32,
    pub start: DateTime<Utc>,
}

impl ReminderNotification {
    /// Snapshot of `event` at arm time. `None` if it has no reminder.
    pub fn for_event(event: &Event) -> Option<Self> {
        Some(Self {
            event_id: event.id,
            title: event.title.clone(),
            reminder: event.reminder?,
            start: event.start,
        })
    }
}

/// Receives fired reminders. Fire-and-forget: the scheduler logs failures
/// and moves on.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &ReminderNotification) -> Result<(), SinkError>;
}

impl<F> NotificationSink for F
where
    F: Fn(&ReminderNotification) -> Result<(), SinkError> + Send + Sync,
{
    fn notify(&self, notification: &ReminderNotification) -> Result<(), SinkError> {
        self(notification)
    }
}

/// Writes every reminder to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, n: &ReminderNotification) -> Result<(), SinkError> {
        tracing::info!(
            event_id = %n.event_id,
            title = %n.title,
            reminder_min = n.reminder,
            start = %n.start.to_rfc3339(),
            "reminder"
        );
        Ok(())
    }
}

/// Forwards reminders into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ReminderNotification>,
}

impl ChannelSink {
    /// A sink and the receiver that observes it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReminderNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, n: &ReminderNotification) -> Result<(), SinkError> {
        self.tx.send(n.clone()).map_err(|_| SinkError::Closed)
    }
}
