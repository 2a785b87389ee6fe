// src/store/memory.rs
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::{KeyValueStore, StoreChange, ViewId};
use crate::consts::STORE_CHANNEL_CAPACITY;
use crate::error::StoreError;

struct Shared {
    map: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<StoreChange>,
}

/// Ephemeral store for tests and sessions without persistence
pub struct MemoryStore {
    shared: Arc<Shared>,
    view: ViewId,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(STORE_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                map: Mutex::new(HashMap::new()),
                changes,
            }),
            view: ViewId::next(),
        }
    }

    /// Another view of the same data
    pub fn view(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            view: ViewId::next(),
        }
    }

    fn publish(&self, change: StoreChange) {
        // no subscribers is fine
        let _ = self.shared.changes.send(change);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.shared.map.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.shared
            .map
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(key.to_owned(), value.to_owned());
        self.publish(StoreChange::written(key, value, self.view));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = self
            .shared
            .map
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .remove(key);
        if removed.is_some() {
            self.publish(StoreChange::removed(key, self.view));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.shared.changes.subscribe()
    }

    fn view_id(&self) -> ViewId {
        self.view
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").field("view", &self.view).finish_non_exhaustive()
    }
}
