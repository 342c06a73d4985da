//! JSON-shaped get/set over the storage backend
//!
//! Reads never fail past this layer: a missing, unreadable or undecodable
//! value becomes `None` (or the supplied fallback). Writes encode first and
//! report an encoding failure to the caller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, instrument};

use super::StorageBackend;
use crate::error::{Error, Result};

/// Shared handle to structured storage
#[derive(Clone)]
pub struct JsonStorage {
    inner: Arc<Inner>,
}

struct Inner {
    backend: StorageBackend,
    /// One FIFO mutex per key, serializing read-modify-write cycles
    key_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl JsonStorage {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                key_locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(StorageBackend::in_memory())
    }

    pub fn backend(&self) -> &StorageBackend {
        &self.inner.backend
    }

    /// Encode a value to its stored form
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Encode and store a value
    #[instrument(skip(self, value))]
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = Self::encode(value).map_err(|e| {
            error!(key, error = %e, "Failed to serialize data");
            e
        })?;
        self.write_raw(key, &raw)
    }

    /// Store an already encoded value
    pub fn write_raw(&self, key: &str, raw: &str) -> Result<()> {
        self.inner.backend.set_item(key, raw)
    }

    /// Strict read: absent is `Ok(None)`, undecodable bytes are
    /// `Error::Decode`, a dead backend is `Error::StorageUnavailable`
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.inner.backend.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| Error::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Lenient read: any failure is logged and yields `None`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "Failed to retrieve and parse data");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.get(key).unwrap_or(fallback)
    }

    /// Whether any value is stored under `key`, decodable or not
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.inner.backend.get_item(key)?.is_some())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.inner.backend.remove_item(key)
    }

    pub fn clear(&self) -> Result<()> {
        self.inner.backend.clear()
    }

    /// The mutex serializing writers of `key`
    pub fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .inner
            .key_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(key.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Announcement, Priority};
    use crate::storage::testing::BrokenTier;
    use crate::storage::TierKind;

    fn sample() -> Vec<Announcement> {
        vec![Announcement {
            id: "1".to_string(),
            title: "Weekly Torah Study".to_string(),
            content: "Every Tuesday at 7:30 PM.".to_string(),
            date: "2024-01-15".to_string(),
            priority: Priority::Medium,
        }]
    }

    #[test]
    fn test_set_then_get_is_deep_equal() {
        let storage = JsonStorage::in_memory();
        storage.set("announcements", &sample()).unwrap();

        let loaded: Option<Vec<Announcement>> = storage.get("announcements");
        assert_eq!(loaded, Some(sample()));
    }

    #[test]
    fn test_absent_key_gives_fallback_or_none() {
        let storage = JsonStorage::in_memory();
        assert_eq!(storage.get::<Vec<Announcement>>("announcements"), None);
        assert_eq!(
            storage.get_or("announcements", sample()),
            sample()
        );
    }

    #[test]
    fn test_corrupted_bytes_give_fallback() {
        let storage = JsonStorage::in_memory();
        storage
            .backend()
            .set_item("announcements", "{not json")
            .unwrap();

        assert_eq!(storage.get::<Vec<Announcement>>("announcements"), None);
        assert_eq!(storage.get_or("announcements", sample()), sample());
        assert!(matches!(
            storage.read::<Vec<Announcement>>("announcements"),
            Err(Error::Decode { .. })
        ));
        assert!(storage.contains("announcements").unwrap());
    }

    #[test]
    fn test_wrong_shape_is_a_decode_failure() {
        let storage = JsonStorage::in_memory();
        storage.set("events", &serde_json::json!({"not": "a list"})).unwrap();
        assert_eq!(storage.get::<Vec<Announcement>>("events"), None);
    }

    #[test]
    fn test_unencodable_value_propagates() {
        let storage = JsonStorage::in_memory();
        let mut value = HashMap::new();
        value.insert((1u8, 2u8), 3u8);

        let result = storage.set("bad", &value);
        assert!(matches!(result, Err(Error::Serialization(_))));
        assert!(!storage.contains("bad").unwrap());
    }

    #[test]
    fn test_dead_backend_reads_as_none() {
        let storage = JsonStorage::new(StorageBackend::from_tiers(vec![Box::new(
            BrokenTier::new(TierKind::Memory),
        )]));

        assert_eq!(storage.get::<Vec<Announcement>>("announcements"), None);
        assert!(matches!(
            storage.read::<Vec<Announcement>>("announcements"),
            Err(Error::StorageUnavailable(_))
        ));
        assert!(storage.set("announcements", &sample()).is_err());
    }

    #[test]
    fn test_key_lock_is_shared_per_key() {
        let storage = JsonStorage::in_memory();
        let a = storage.key_lock("events");
        let b = storage.clone().key_lock("events");
        let c = storage.key_lock("announcements");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
