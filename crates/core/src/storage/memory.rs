//! In-process memory tier, the last resort of the chain

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::{StorageTier, TierKind};
use crate::error::Result;

#[derive(Default)]
pub struct MemoryTier {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageTier for MemoryTier {
    fn kind(&self) -> TierKind {
        TierKind::Memory
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.map().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.map().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.map().clear();
        Ok(())
    }
}
