//! Core error types for remindcal-core.
//!
//! This module defines the error hierarchy using thiserror. Field-level
//! validation problems are collected into [`FieldErrors`] so a caller can
//! render every problem at once.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventId;

/// Message used when the backend rejects a write because of a uniqueness rule.
pub const DUPLICATE_FIELD_MESSAGE: &str = "This is a duplicate field. Please enter a new one.";

/// Event fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Title,
    Start,
    End,
    Reminder,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Start => "start",
            Field::End => "end",
            Field::Reminder => "reminder",
        }
    }

    /// Map a backend column name to a field, if it is one the caller can fix.
    pub fn from_column(column: &str) -> Option<Self> {
        match column {
            "id" => Some(Field::Id),
            "title" => Some(Field::Title),
            "start" | "start_at" => Some(Field::Start),
            "end" | "end_at" => Some(Field::End),
            "reminder" | "reminder_min" => Some(Field::Reminder),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed validation messages, one per field.
///
/// Serializes as a JSON object: `{"title": "...", "end": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set holding a single message.
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message for `field`. The first message recorded for a field wins.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Error returned by the event store.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// One or more field invariants were violated. Nothing was written.
    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    /// The referenced event does not exist.
    #[error("Event not found: {0}")]
    NotFound(EventId),

    /// The persistence backend failed.
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for CalendarError {
    fn from(err: StorageError) -> Self {
        match err {
            // Uniqueness violations are something the caller can fix, so they
            // take the same shape as validation failures.
            StorageError::DuplicateKey { field } => {
                CalendarError::ValidationFailed(FieldErrors::single(field, DUPLICATE_FIELD_MESSAGE))
            }
            other => CalendarError::Storage(other),
        }
    }
}

impl From<FieldErrors> for CalendarError {
    fn from(errors: FieldErrors) -> Self {
        CalendarError::ValidationFailed(errors)
    }
}

/// Persistence backend errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A uniqueness constraint rejected the write
    #[error("Duplicate value for '{field}'")]
    DuplicateKey { field: Field },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be decoded
    #[error("Corrupt row for event {id}: {message}")]
    CorruptRow { id: String, message: String },

    /// Data directory could not be prepared
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home directory could not be resolved
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Notification delivery errors. Never escape the scheduler.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Notification channel closed")]
    Closed,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg) => match code.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    StorageError::Locked
                }
                rusqlite::ErrorCode::ConstraintViolation => {
                    match msg.as_deref().and_then(unique_violation_field) {
                        Some(field) => StorageError::DuplicateKey { field },
                        None => StorageError::QueryFailed(err.to_string()),
                    }
                }
                _ => StorageError::QueryFailed(err.to_string()),
            },
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Extract the offending column from `UNIQUE constraint failed: events.id`.
fn unique_violation_field(message: &str) -> Option<Field> {
    let rest = message.strip_prefix("UNIQUE constraint failed: ")?;
    let first = rest.split(',').next()?.trim();
    let column = first.rsplit('.').next()?;
    Field::from_column(column)
}

/// Result type alias for CalendarError
pub type Result<T, E = CalendarError> = std::result::Result<T, E>;
