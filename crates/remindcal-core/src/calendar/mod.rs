//! Read-only calendar queries: day overlap, month grid, agenda.

pub mod agenda;
pub mod day;

pub use agenda::agenda;
pub use day::{events_on_day, is_on_day, month_grid, DayCell};
