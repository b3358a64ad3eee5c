//! Load and save of the item list and history to a durable key-value store.
//!
//! Every write replaces the whole value under its key. Values are serialized
//! before the store is touched, so a serialization failure never reaches the
//! stored data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;
use crate::models::{Item, Snapshot};

pub const ITEMS_KEY: &str = "budgetItems";
pub const HISTORY_KEY: &str = "budgetHistory";

/// A string-keyed store of string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key` atomically.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.lock()?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.lock()?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.lock()?;
        values.remove(key);
        Ok(())
    }
}

/// Serializes budget state into a [`KeyValueStore`].
///
/// Cloning is cheap and every clone writes to the same store.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn save_items(&self, items: &[Item]) -> Result<(), StorageError> {
        self.save(ITEMS_KEY, items)
    }

    /// Stored items with their subtotals recomputed. Empty when nothing is stored.
    pub fn load_items(&self) -> Result<Vec<Item>, StorageError> {
        let mut items: Vec<Item> = self.load(ITEMS_KEY)?;
        for item in &mut items {
            item.recompute();
        }
        Ok(items)
    }

    pub fn save_history(&self, history: &[Snapshot]) -> Result<(), StorageError> {
        self.save(HISTORY_KEY, history)
    }

    pub fn load_history(&self) -> Result<Vec<Snapshot>, StorageError> {
        let mut history: Vec<Snapshot> = self.load(HISTORY_KEY)?;
        for snapshot in &mut history {
            for item in snapshot.items_mut() {
                item.recompute();
            }
        }
        Ok(history)
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)?;
        tracing::debug!("Persisted {} ({} bytes)", key, json.len());
        Ok(())
    }

    /// Drop the stored history entirely.
    pub fn clear_history(&self) -> Result<(), StorageError> {
        self.store.remove(HISTORY_KEY)?;
        tracing::debug!("Removed {}", HISTORY_KEY);
        Ok(())
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StorageError> {
        let Some(json) = self.store.get(key)? else {
            return Ok(T::default());
        };
        serde_json::from_str(&json).map_err(|source| {
            let backup_key = match self.back_up(key, &json) {
                Ok(backup_key) => Some(backup_key),
                Err(e) => {
                    tracing::warn!("Could not copy unreadable {} aside: {}", key, e);
                    None
                }
            };
            StorageError::Corrupted {
                key: key.to_string(),
                backup_key,
                source,
            }
        })
    }

    /// Copy an unreadable value to `<key>.corrupted` (or the first free
    /// `<key>.corrupted.N`) so a later save cannot destroy it. A slot already
    /// holding the same value is reused.
    fn back_up(&self, key: &str, raw: &str) -> Result<String, StorageError> {
        let base = format!("{key}.corrupted");
        for n in 0u32.. {
            let candidate = if n == 0 { base.clone() } else { format!("{base}.{n}") };
            match self.store.get(&candidate)? {
                Some(existing) if existing == raw => return Ok(candidate),
                Some(_) => continue,
                None => {
                    self.store.set(&candidate, raw)?;
                    tracing::warn!("Copied unreadable {} to {}", key, candidate);
                    return Ok(candidate);
                }
            }
        }
        Err(StorageError::Unavailable(format!("no free backup slot for {key}")))
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway").finish_non_exhaustive()
    }
}
