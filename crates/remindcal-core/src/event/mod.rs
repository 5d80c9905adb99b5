//! Event records, their validation rules, and the store that owns them.

mod model;
mod store;
pub mod validate;

pub use model::{Event, EventId, EventInput, ValidatedEvent};
pub use store::EventStore;
pub use validate::{parse_instant, validate};
