//! Application bootstrap
//!
//! Loads the three collections and, on a fresh install, seeds them with
//! the built-in content. "Fresh" is decided once for the whole store: all
//! three keys must be absent, or hold bytes that do not decode. Storage holding only some of the keys (for
//! example after a partially failed first run) counts as initialized and
//! is not re-seeded.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::collection::CollectionStore;
use crate::error::{Error, Result};
use crate::export::ExportSnapshot;
use crate::models::{Announcement, Entity, Event, GalleryImage};
use crate::seed;
use crate::storage::JsonStorage;

pub const INIT_FAILED: &str = "Failed to initialize the application. Please refresh the page.";

/// Coarse application state; both ready states are terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootStatus {
    Initializing,
    Ready,
    ReadyWithError(String),
}

impl BootStatus {
    pub fn is_ready(&self) -> bool {
        !matches!(self, BootStatus::Initializing)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BootStatus::ReadyWithError(message) => Some(message),
            _ => None,
        }
    }
}

/// Content written on first run
#[derive(Debug, Clone)]
pub struct Seeds {
    pub announcements: Vec<Announcement>,
    pub events: Vec<Event>,
    pub gallery_images: Vec<GalleryImage>,
}

impl Default for Seeds {
    fn default() -> Self {
        Self {
            announcements: seed::announcements(),
            events: seed::events(),
            gallery_images: seed::gallery_images(),
        }
    }
}

/// The three collections of the site plus their bootstrap status
pub struct SiteData {
    storage: JsonStorage,
    pub announcements: CollectionStore<Announcement>,
    pub events: CollectionStore<Event>,
    pub gallery: CollectionStore<GalleryImage>,
    status: RwLock<BootStatus>,
}

impl SiteData {
    /// Stores start empty and loading; call [`SiteData::bootstrap`] next
    pub fn new(storage: JsonStorage, write_timeout: Duration) -> Self {
        Self {
            announcements: CollectionStore::new(storage.clone(), Vec::new())
                .with_write_timeout(write_timeout),
            events: CollectionStore::new(storage.clone(), Vec::new())
                .with_write_timeout(write_timeout),
            gallery: CollectionStore::new(storage.clone(), Vec::new())
                .with_write_timeout(write_timeout),
            storage,
            status: RwLock::new(BootStatus::Initializing),
        }
    }

    /// Create and bootstrap with the built-in seed content
    pub async fn initialize(storage: JsonStorage, write_timeout: Duration) -> Self {
        let site = Self::new(storage, write_timeout);
        site.bootstrap(Seeds::default()).await;
        site
    }

    pub fn status(&self) -> BootStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while any collection is still loading
    pub fn is_loading(&self) -> bool {
        self.announcements.is_loading() || self.events.is_loading() || self.gallery.is_loading()
    }

    pub fn storage(&self) -> &JsonStorage {
        &self.storage
    }

    /// Run the one-time initialization. Never fails: any seeding failure
    /// ends in `ReadyWithError` with whatever the stores hold in memory.
    #[instrument(skip_all)]
    pub async fn bootstrap(&self, seeds: Seeds) {
        if self.status().is_ready() {
            warn!("Bootstrap already finished, ignoring");
            return;
        }

        let fresh = self.is_fresh_install().await;

        tokio::join!(
            self.announcements.load(),
            self.events.load(),
            self.gallery.load()
        );

        if !fresh {
            self.finish(BootStatus::Ready);
            return;
        }

        info!("Fresh install, seeding default content");
        let (announcements, events, gallery) = tokio::join!(
            self.announcements.replace_all(seeds.announcements),
            self.events.replace_all(seeds.events),
            self.gallery.replace_all(seeds.gallery_images)
        );

        let mut failed = false;
        for (key, result) in [
            (Announcement::COLLECTION_KEY, announcements),
            (Event::COLLECTION_KEY, events),
            (GalleryImage::COLLECTION_KEY, gallery),
        ] {
            if let Err(e) = result {
                error!(key, error = %e, "Seeding failed");
                failed = true;
            }
        }

        if failed {
            self.finish(BootStatus::ReadyWithError(INIT_FAILED.to_string()));
        } else {
            self.finish(BootStatus::Ready);
        }
    }

    /// All three keys absent or undecodable. A failing check counts as
    /// "not fresh".
    async fn is_fresh_install(&self) -> bool {
        let storage = self.storage.clone();
        let check = tokio::task::spawn_blocking(move || -> Result<bool> {
            for key in [
                Announcement::COLLECTION_KEY,
                Event::COLLECTION_KEY,
                GalleryImage::COLLECTION_KEY,
            ] {
                // Bytes that do not decode count as absent
                match storage.read::<serde_json::Value>(key) {
                    Ok(Some(_)) => return Ok(false),
                    Ok(None) | Err(Error::Decode { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(true)
        })
        .await;

        match check {
            Ok(Ok(fresh)) => fresh,
            Ok(Err(e)) => {
                error!(error = %e, "Check if app needs initialization failed");
                false
            }
            Err(e) => {
                error!(error = %e, "Initialization check task failed");
                false
            }
        }
    }

    fn finish(&self, next: BootStatus) {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if *status != BootStatus::Initializing {
            return;
        }
        info!(status = ?next, "Site data ready");
        *status = next;
    }

    /// Snapshot of every collection for download
    pub fn export(&self) -> ExportSnapshot {
        ExportSnapshot::new(
            self.announcements.items(),
            self.gallery.items(),
            self.events.items(),
        )
    }

    /// Wipe the active storage tier, then persist an empty array for each
    /// collection
    pub async fn clear_everything(&self) -> Result<()> {
        self.storage.clear()?;
        let (announcements, events, gallery) = tokio::join!(
            self.announcements.clear_all(),
            self.events.clear_all(),
            self.gallery.clear_all()
        );
        announcements?;
        events?;
        gallery?;
        info!("All site data cleared");
        Ok(())
    }
}
