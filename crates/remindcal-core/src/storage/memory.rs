//! In-process event storage.

use indexmap::IndexMap;

use super::EventRepository;
use crate::error::{Field, StorageError};
use crate::event::{Event, EventId};

/// Keeps events in an insertion-ordered map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    events: IndexMap<EventId, Event>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventRepository for MemoryRepository {
    fn insert(&mut self, event: &Event) -> Result<(), StorageError> {
        if self.events.contains_key(&event.id) {
            return Err(StorageError::DuplicateKey { field: Field::Id });
        }
        self.events.insert(event.id, event.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Event>, StorageError> {
        Ok(self.events.values().cloned().collect())
    }

    fn get(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        Ok(self.events.get(&id).cloned())
    }

    fn replace(&mut self, event: &Event) -> Result<bool, StorageError> {
        match self.events.get_mut(&event.id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&mut self, id: EventId) -> Result<Option<Event>, StorageError> {
        // shift_remove keeps the remaining events in insertion order.
        Ok(self.events.shift_remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn event(title: &str) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        Event {
            id: EventId::new(),
            title: title.into(),
            start,
            end: start + Duration::hours(1),
            describe: None,
            reminder: None,
        }
    }

    #[test]
    fn list_preserves_insertion_order_after_removal() {
        let mut repo = MemoryRepository::new();
        let (a, b, c) = (event("a"), event("b"), event("c"));
        for e in [&a, &b, &c] {
            repo.insert(e).unwrap();
        }
        repo.remove(b.id).unwrap();
        let titles: Vec<_> = repo.list().unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut repo = MemoryRepository::new();
        let e = event("a");
        repo.insert(&e).unwrap();
        assert!(matches!(
            repo.insert(&e),
            Err(StorageError::DuplicateKey { field: Field::Id })
        ));
    }

    #[test]
    fn replace_missing_returns_false() {
        let mut repo = MemoryRepository::new();
        assert!(!repo.replace(&event("ghost")).unwrap());
    }
}
