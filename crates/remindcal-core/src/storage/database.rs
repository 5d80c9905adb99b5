//! SQLite-based event storage.
//!
//! Instants are stored as RFC 3339 UTC strings; the reminder offset as a
//! nullable integer number of minutes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{migrations, EventRepository};
use crate::error::StorageError;
use crate::event::{Event, EventId};

const SELECT_COLUMNS: &str = "SELECT id, title, start_at, end_at, describe, reminder_min FROM events";

/// Raw row before decoding, so decode failures can name the offending id.
struct EventRow {
    id: String,
    title: String,
    start_at: String,
    end_at: String,
    describe: Option<String>,
    reminder_min: Option<i64>,
}

fn read_row(row: &rusqlite::Row) -> Result<EventRow, rusqlite::Error> {
    Ok(EventRow {
        id: row.get(0)?,
        title: row.get(1)?,
        start_at: row.get(2)?,
        end_at: row.get(3)?,
        describe: row.get(4)?,
        reminder_min: row.get(5)?,
    })
}

fn parse_datetime(id: &str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow {
            id: id.to_string(),
            message: format!("bad timestamp '{raw}': {e}"),
        })
}

impl EventRow {
    fn into_event(self) -> Result<Event, StorageError> {
        let id = self.id.parse::<EventId>().map_err(|e| StorageError::CorruptRow {
            id: self.id.clone(),
            message: e.to_string(),
        })?;
        let reminder = self
            .reminder_min
            .map(u32::try_from)
            .transpose()
            .map_err(|_| StorageError::CorruptRow {
                id: self.id.clone(),
                message: "reminder out of range".into(),
            })?;
        Ok(Event {
            id,
            title: self.title,
            start: parse_datetime(&self.id, &self.start_at)?,
            end: parse_datetime(&self.id, &self.end_at)?,
            describe: self.describe,
            reminder,
        })
    }
}

/// SQLite database for event storage.
pub struct SqliteRepository {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteRepository {
    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self {
            conn,
            path: Some(path),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, path: None };
        db.migrate()?;
        Ok(db)
    }

    /// Location on disk, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn migrate(&self) -> Result<(), StorageError> {
        migrations::migrate(&self.conn).map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }
}

impl EventRepository for SqliteRepository {
    fn insert(&mut self, event: &Event) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO events (id, title, start_at, end_at, describe, reminder_min)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.id.to_string(),
                event.title,
                event.start.to_rfc3339(),
                event.end.to_rfc3339(),
                event.describe,
                event.reminder,
            ],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Event>, StorageError> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY seq"))?;
        let rows = stmt.query_map([], read_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }

    fn get(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        let row = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                read_row,
            )
            .optional()?;
        row.map(EventRow::into_event).transpose()
    }

    fn replace(&mut self, event: &Event) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE events
             SET title = ?2, start_at = ?3, end_at = ?4, describe = ?5, reminder_min = ?6
             WHERE id = ?1",
            params![
                event.id.to_string(),
                event.title,
                event.start.to_rfc3339(),
                event.end.to_rfc3339(),
                event.describe,
                event.reminder,
            ],
        )?;
        Ok(changed > 0)
    }

    fn remove(&mut self, id: EventId) -> Result<Option<Event>, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let row = tx
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                read_row,
            )
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        tx.execute("DELETE FROM events WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;
        row.into_event().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Field;
    use chrono::{Duration, TimeZone};

    fn event(title: &str, reminder: Option<u32>) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        Event {
            id: EventId::new(),
            title: title.into(),
            start,
            end: start + Duration::hours(2),
            describe: Some("notes".into()),
            reminder,
        }
    }

    #[test]
    fn insert_and_get() {
        let mut db = SqliteRepository::open_memory().unwrap();
        let e = event("Review", Some(10));
        db.insert(&e).unwrap();
        assert_eq!(db.get(e.id).unwrap(), Some(e));
    }

    #[test]
    fn duplicate_id_maps_to_duplicate_key() {
        let mut db = SqliteRepository::open_memory().unwrap();
        let e = event("Review", None);
        db.insert(&e).unwrap();
        match db.insert(&e) {
            Err(StorageError::DuplicateKey { field }) => assert_eq!(field, Field::Id),
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn replace_and_remove() {
        let mut db = SqliteRepository::open_memory().unwrap();
        let mut e = event("Draft", None);
        db.insert(&e).unwrap();

        e.title = "Final".into();
        e.reminder = Some(5);
        assert!(db.replace(&e).unwrap());
        assert_eq!(db.get(e.id).unwrap().unwrap().title, "Final");

        assert_eq!(db.remove(e.id).unwrap().map(|r| r.id), Some(e.id));
        assert!(db.remove(e.id).unwrap().is_none());
        assert!(db.get(e.id).unwrap().is_none());
    }

    #[test]
    fn list_is_in_insertion_order() {
        let mut db = SqliteRepository::open_memory().unwrap();
        for title in ["one", "two", "three"] {
            db.insert(&event(title, None)).unwrap();
        }
        let titles: Vec<_> = db.list().unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }
}
