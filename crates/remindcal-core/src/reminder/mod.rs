mod driver;
mod scheduler;
mod sink;

pub use driver::{ReminderDriver, SharedStore};
pub use scheduler::{ArmOutcome, ReminderScheduler, ReminderState, SchedulerStats};
pub use sink::{ChannelSink, LogSink, NotificationSink, ReminderNotification};
