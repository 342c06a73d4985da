//! Storage tier trait
//!
//! A tier is one storage medium in the fallback chain. Implementations
//! may be backed by SQLite, plain files, memory, or a test double.

use crate::error::Result;

/// Key written and removed when probing a tier
pub const PROBE_KEY: &str = "__storage_test__";

/// Which medium a tier represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    /// Survives process restart
    Durable,
    /// Survives a reload, not a restart
    Session,
    /// Lives and dies with the process
    Memory,
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierKind::Durable => write!(f, "durable"),
            TierKind::Session => write!(f, "session"),
            TierKind::Memory => write!(f, "memory"),
        }
    }
}

/// Key/value string storage operations
pub trait StorageTier: Send + Sync {
    fn kind(&self) -> TierKind;

    /// Read a value, `None` when the key is absent
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key (absent keys are not an error)
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key held by this tier
    fn clear(&self) -> Result<()>;

    /// Check the tier accepts a write round-trip
    fn probe(&self) -> Result<()> {
        self.set_item(PROBE_KEY, "test")?;
        self.remove_item(PROBE_KEY)
    }
}
