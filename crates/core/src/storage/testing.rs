//! Test doubles for storage tiers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::memory::MemoryTier;
use super::traits::{StorageTier, TierKind};
use crate::error::{Error, Result};

fn broken(kind: TierKind) -> Error {
    Error::StorageUnavailable(format!("{} tier is broken", kind))
}

/// Fails every call, including the probe
pub(crate) struct BrokenTier {
    kind: TierKind,
}

impl BrokenTier {
    pub(crate) fn new(kind: TierKind) -> Self {
        Self { kind }
    }
}

impl StorageTier for BrokenTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(broken(self.kind))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(broken(self.kind))
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(broken(self.kind))
    }

    fn clear(&self) -> Result<()> {
        Err(broken(self.kind))
    }
}

/// Memory-backed tier that can be switched into failure at runtime
pub(crate) struct FlakyTier {
    kind: TierKind,
    inner: Arc<MemoryTier>,
    failing: Arc<AtomicBool>,
}

/// Handle controlling a [`FlakyTier`] after it moved into a backend
#[derive(Clone)]
pub(crate) struct FlakySwitch {
    inner: Arc<MemoryTier>,
    failing: Arc<AtomicBool>,
}

impl FlakyTier {
    pub(crate) fn new(kind: TierKind) -> Self {
        Self {
            kind,
            inner: Arc::new(MemoryTier::new()),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn switch(&self) -> FlakySwitch {
        FlakySwitch {
            inner: self.inner.clone(),
            failing: self.failing.clone(),
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(broken(self.kind));
        }
        Ok(())
    }
}

impl FlakySwitch {
    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Read the tier's contents directly, bypassing the failure switch
    pub(crate) fn peek(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }
}

impl StorageTier for FlakyTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        self.check()?;
        self.inner.clear()
    }
}

/// Memory tier whose writes block for a while (probe writes are not delayed)
pub(crate) struct SlowTier {
    delay: Duration,
    inner: MemoryTier,
}

impl SlowTier {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: MemoryTier::new(),
        }
    }
}

impl StorageTier for SlowTier {
    fn kind(&self) -> TierKind {
        TierKind::Durable
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if key != super::PROBE_KEY {
            std::thread::sleep(self.delay);
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}

/// Memory tier that refuses writes to one key
pub(crate) struct RejectKeyTier {
    rejected: &'static str,
    inner: MemoryTier,
}

impl RejectKeyTier {
    pub(crate) fn new(rejected: &'static str) -> Self {
        Self {
            rejected,
            inner: MemoryTier::new(),
        }
    }
}

impl StorageTier for RejectKeyTier {
    fn kind(&self) -> TierKind {
        TierKind::Durable
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if key == self.rejected {
            return Err(Error::StorageUnavailable(format!("writes to '{}' rejected", key)));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}
