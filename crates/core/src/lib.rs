//! Noticeboard Core Library
//!
//! Locally persisted collections (announcements, events, gallery images)
//! for a community noticeboard: tiered storage with graceful fallback,
//! JSON structured storage, per-collection stores and first-run seeding.

pub mod bootstrap;
pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod seed;
pub mod storage;

pub use bootstrap::{BootStatus, Seeds, SiteData};
pub use collection::{CollectionSnapshot, CollectionStore};
pub use config::StorageConfig;
pub use error::{Error, Result};
pub use export::ExportSnapshot;
pub use models::*;
pub use storage::{
    FileTier, JsonStorage, MemoryTier, SqliteTier, StorageBackend, StorageTier, TierKind,
};
