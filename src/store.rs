use crate::reading::SensorReading;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    reading: SensorReading,
    updated_at: Option<DateTime<Utc>>,
}

/// Latest-value cell shared between the ingest task (sole writer) and HTTP handlers.
///
/// Both sides hold the lock only long enough to copy a small `Copy` value, so a
/// slow reader can never hold up the writer for longer than that copy.
#[derive(Debug, Clone, Default)]
pub struct ReadingStore {
    inner: Arc<RwLock<Entry>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, reading: SensorReading) {
        let entry = Entry {
            reading,
            updated_at: Some(Utc::now()),
        };
        // The entry is replaced whole, so a poisoned lock still guards a consistent value.
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = entry;
    }

    pub fn read(&self) -> SensorReading {
        self.entry().reading
    }

    /// Time of the last successful write; `None` until the first reading arrives.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.entry().updated_at
    }

    fn entry(&self) -> Entry {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}
