use crate::adapter::SnapshotAdapter;
use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, warn};

pub type RecordId = u64;

/// A record kept in an [`EntityStore`], identified by a unique integer id.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
}

/// Ordered collection of records mirrored write-through to one adapter key.
pub struct EntityStore<T> {
    adapter: Rc<dyn SnapshotAdapter>,
    key: String,
    seed: Vec<T>,
    items: Vec<T>,
    persisted: bool,
}

impl<T: Record> EntityStore<T> {
    /// Creates the store and hydrates it from `adapter`, falling back to `seed`.
    pub fn open(adapter: Rc<dyn SnapshotAdapter>, key: impl Into<String>, seed: Vec<T>) -> Self {
        let mut store = Self {
            adapter,
            key: key.into(),
            seed,
            items: Vec::new(),
            persisted: true,
        };
        store.load();
        store
    }

    /// Re-reads the snapshot. A missing, unreadable or corrupt snapshot is
    /// treated as "no prior snapshot" and yields the seed.
    pub fn load(&mut self) -> &[T] {
        self.items = match self.adapter.read(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "corrupt snapshot, using seed data");
                    self.seed.clone()
                }
            },
            Ok(None) => {
                debug!(key = %self.key, "no snapshot, using seed data");
                self.seed.clone()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "snapshot unreadable, using seed data");
                self.seed.clone()
            }
        };
        self.persisted = true;
        &self.items
    }

    pub fn list(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.items.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// `max(existing ids) + 1`, or `1` for an empty collection. Once the
    /// maximum id is `RecordId::MAX` the lowest unused id is handed out.
    pub fn next_id(&self) -> RecordId {
        match self.items.iter().map(Record::id).max() {
            None => 1,
            Some(m) => m.checked_add(1).unwrap_or_else(|| self.lowest_free_id()),
        }
    }

    fn lowest_free_id(&self) -> RecordId {
        let mut used: Vec<RecordId> = self.items.iter().map(Record::id).collect();
        used.sort_unstable();
        used.dedup();
        let mut candidate = 1;
        for id in used {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }
        candidate
    }

    /// Replaces the record with the same id in place, or appends it under a
    /// freshly assigned id. Returns the record as stored.
    pub fn upsert(&mut self, mut record: T) -> T {
        let id = record.id();
        match self.items.iter().position(|r| r.id() == id) {
            Some(idx) => {
                self.items[idx] = record.clone();
            }
            None => {
                record.set_id(self.next_id());
                self.items.push(record.clone());
            }
        }
        self.persist();
        record
    }

    /// Drops the record with `id`; an absent id leaves the collection as is.
    pub fn remove(&mut self, id: RecordId) -> &[T] {
        self.items.retain(|r| r.id() != id);
        self.persist();
        &self.items
    }

    /// Whether the last mutation reached the adapter.
    pub fn persisted(&self) -> bool {
        self.persisted
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.items)
            .map_err(|e| StorageError::encode(&self.key, e))
            .and_then(|raw| self.adapter.write(&self.key, &raw));
        self.persisted = match result {
            Ok(()) => true,
            Err(e) => {
                // The in-memory copy stays authoritative for this session.
                warn!(key = %self.key, error = %e, "snapshot write failed");
                false
            }
        };
    }
}
