//! Tiered key/value storage for Noticeboard
//!
//! The backend owns an ordered chain of tiers (durable, session, memory).
//! The first tier that passes its probe at construction becomes active;
//! a tier that fails at runtime is demoted and the call continues on the
//! next one, so no tier failure escapes as long as one tier still works.

mod files;
mod json;
mod memory;
mod migrations;
mod sqlite;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, instrument, warn};

use crate::config::StorageConfig;
use crate::error::{Error, Result};

pub use files::FileTier;
pub use json::JsonStorage;
pub use memory::MemoryTier;
pub use sqlite::SqliteTier;
pub use traits::{StorageTier, TierKind, PROBE_KEY};

/// Fallback chain of storage tiers
pub struct StorageBackend {
    tiers: Vec<Box<dyn StorageTier>>,
    /// Index of the tier serving reads and writes; only ever moves forward
    active: AtomicUsize,
}

impl StorageBackend {
    /// Build a chain from an explicit tier list, probing once to pick the
    /// active tier
    pub fn from_tiers(tiers: Vec<Box<dyn StorageTier>>) -> Self {
        let active = tiers
            .iter()
            .position(|tier| match tier.probe() {
                Ok(()) => true,
                Err(e) => {
                    warn!(tier = %tier.kind(), error = %e, "Storage tier failed probe");
                    false
                }
            })
            .unwrap_or(tiers.len().saturating_sub(1));

        if let Some(tier) = tiers.get(active) {
            info!(tier = %tier.kind(), "Storage tier selected");
        }

        Self {
            tiers,
            active: AtomicUsize::new(active),
        }
    }

    /// Open the configured chain: durable, then session, then memory.
    ///
    /// A tier that cannot be opened is skipped; the memory tier is always
    /// present, so this never fails.
    #[instrument(skip(config))]
    pub fn open(config: &StorageConfig) -> Self {
        let mut tiers: Vec<Box<dyn StorageTier>> = Vec::new();

        if config.durable {
            let durable = config.database_path().and_then(|path| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                SqliteTier::open(&path)
            });
            match durable {
                Ok(tier) => tiers.push(Box::new(tier)),
                Err(e) => warn!(error = %e, "Durable storage unavailable"),
            }
        }

        if config.session {
            match FileTier::open(config.resolved_session_dir()) {
                Ok(tier) => tiers.push(Box::new(tier)),
                Err(e) => warn!(error = %e, "Session storage unavailable"),
            }
        }

        tiers.push(Box::new(MemoryTier::new()));
        Self::from_tiers(tiers)
    }

    /// Memory-only chain (for testing and ephemeral use)
    pub fn in_memory() -> Self {
        Self::from_tiers(vec![Box::new(MemoryTier::new())])
    }

    /// Kind of the tier currently serving calls
    pub fn active_tier(&self) -> Option<TierKind> {
        self.tiers
            .get(self.active.load(Ordering::Acquire))
            .map(|tier| tier.kind())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.run("get", key, |tier| tier.get_item(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.run("set", key, |tier| tier.set_item(key, value))
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.run("remove", key, |tier| tier.remove_item(key))
    }

    /// Clear the tier serving reads. Tiers earlier in the chain that were
    /// demoted keep whatever they held.
    pub fn clear(&self) -> Result<()> {
        self.run("clear", "*", |tier| tier.clear())
    }

    /// Try the active tier, then each later one, demoting past failures
    fn run<R>(&self, op: &str, key: &str, call: impl Fn(&dyn StorageTier) -> Result<R>) -> Result<R> {
        let start = self.active.load(Ordering::Acquire);

        for (index, tier) in self.tiers.iter().enumerate().skip(start) {
            match call(tier.as_ref()) {
                Ok(value) => {
                    if index != start {
                        self.demote_to(index);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!(tier = %tier.kind(), op, key, error = %e, "Storage tier failed, degrading");
                }
            }
        }

        Err(Error::StorageUnavailable(format!(
            "{} '{}' failed on every tier",
            op, key
        )))
    }

    fn demote_to(&self, index: usize) {
        let previous = self.active.fetch_max(index, Ordering::AcqRel);
        if previous < index {
            info!(tier = %self.tiers[index].kind(), "Storage demoted to next tier");
        }
    }
}
