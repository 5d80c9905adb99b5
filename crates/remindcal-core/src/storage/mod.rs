mod config;
pub mod database;
pub mod memory;
pub mod migrations;

pub use config::{Config, LoggingConfig, RemindersConfig, DEFAULT_TIMEZONE};
pub use database::SqliteRepository;
pub use memory::MemoryRepository;

use std::path::PathBuf;

use crate::error::StorageError;
use crate::event::{Event, EventId};

/// Durable keyed storage for events.
///
/// Implementations only persist; validation and reminder bookkeeping live in
/// [`crate::EventStore`].
pub trait EventRepository: Send {
    /// Persist a new event. Fails with `DuplicateKey` if the id is taken.
    fn insert(&mut self, event: &Event) -> Result<(), StorageError>;

    /// All events in insertion order.
    fn list(&self) -> Result<Vec<Event>, StorageError>;

    fn get(&self, id: EventId) -> Result<Option<Event>, StorageError>;

    /// Overwrite the stored event with the same id. Returns `false` if absent.
    fn replace(&mut self, event: &Event) -> Result<bool, StorageError>;

    /// Remove and return the event, if present.
    fn remove(&mut self, id: EventId) -> Result<Option<Event>, StorageError>;
}

/// Returns the data directory.
///
/// `REMINDCAL_HOME` wins when set. Otherwise `~/.config/remindcal`, or
/// `~/.config/remindcal-dev` when `REMINDCAL_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("REMINDCAL_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("REMINDCAL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("remindcal-dev")
            } else {
                base_dir.join("remindcal")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
