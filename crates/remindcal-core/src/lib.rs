//! # Remindcal Core Library
//!
//! Core logic for a personal calendar: validated event records, calendar
//! day and agenda views, and per-event reminder timers. The `remindcal` CLI
//! is a thin transport over this library.
//!
//! ## Architecture
//!
//! - **Event Store**: validated create/read/update/delete. Every mutation
//!   keeps the reminder table in step with the persisted record
//! - **Reminder Scheduler**: a deadline table the caller drives with
//!   `fire_due()`, plus an async driver that sleeps until the next deadline
//! - **Calendar**: day overlap, month grid and agenda queries in a reference
//!   time zone
//! - **Storage**: SQLite event persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`EventStore`]: the operation surface
//! - [`ReminderScheduler`]: per-event timers
//! - [`ReminderDriver`]: async loop firing due reminders
//! - [`Clock`]: injected source of "now" and the reference zone
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod clock;
pub mod error;
pub mod event;
pub mod logging;
pub mod reminder;
pub mod storage;

pub use calendar::{agenda, events_on_day, is_on_day, month_grid, DayCell};
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use error::{CalendarError, ConfigError, Field, FieldErrors, SinkError, StorageError};
pub use event::{Event, EventId, EventInput, EventStore};
pub use reminder::{
    ArmOutcome, ChannelSink, LogSink, NotificationSink, ReminderDriver, ReminderNotification,
    ReminderScheduler, ReminderState, SchedulerStats, SharedStore,
};
pub use storage::{Config, EventRepository, MemoryRepository, SqliteRepository};
