// src/store/mod.rs
//! Local key-value persistence shared between views
//!
//! Every handle is a *view* of one underlying store. Writes through any view
//! are published to all subscribers, tagged with the writing view's id, so a
//! component can react to settings changed elsewhere.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use crate::consts::BACKUP_ENTRIES_KEY;
use crate::error::StoreError;

// keys whose values never travel through the change channel
const WITHHELD_KEYS: &[&str] = &[BACKUP_ENTRIES_KEY];

/// Identifies the view a change originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a subscriber learns about the written value
#[derive(Clone, PartialEq, Eq)]
pub enum ChangeValue {
    Set(String),
    /// Written, but the value is a plaintext vault snapshot and is never
    /// copied onto the channel; read it from the store if needed
    Withheld,
    Removed,
}

impl ChangeValue {
    fn for_write(key: &str, value: &str) -> Self {
        if WITHHELD_KEYS.contains(&key) {
            Self::Withheld
        } else {
            Self::Set(value.to_owned())
        }
    }

    /// The published value, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Set(value) => Some(value),
            Self::Withheld | Self::Removed => None,
        }
    }
}

impl fmt::Debug for ChangeValue {
    // values may be user settings; keep them out of logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Set(_) => "set",
            Self::Withheld => "withheld",
            Self::Removed => "removed",
        })
    }
}

/// A committed write
#[derive(Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    pub value: ChangeValue,
    pub origin: ViewId,
}

impl StoreChange {
    pub(crate) fn written(key: &str, value: &str, origin: ViewId) -> Self {
        Self {
            key: key.to_owned(),
            value: ChangeValue::for_write(key, value),
            origin,
        }
    }

    pub(crate) fn removed(key: &str, origin: ViewId) -> Self {
        Self {
            key: key.to_owned(),
            value: ChangeValue::Removed,
            origin,
        }
    }
}

impl fmt::Debug for StoreChange {
    // values may be user settings; keep them out of logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.value {
            ChangeValue::Set(_) => "set",
            ChangeValue::Withheld => "withheld",
            ChangeValue::Removed => "removed",
        };
        f.debug_struct("StoreChange")
            .field("key", &self.key)
            .field("value", &kind)
            .field("origin", &self.origin)
            .finish()
    }
}

pub trait KeyValueStore: Send + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Changes written through any view after this call
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
    fn view_id(&self) -> ViewId;
}
