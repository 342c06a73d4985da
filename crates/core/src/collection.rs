//! Persistent collection store
//!
//! One store owns the in-memory copy of one collection. Every mutation
//! runs under the collection key's FIFO lock: it starts from the last
//! adopted sequence, persists the next one, and only then adopts it. A
//! failed persist leaves the adopted sequence untouched, sets the store's
//! error flag and returns the error to the caller.
//!
//! A write that misses its deadline is reported as `Error::Timeout`, but
//! it keeps the key lock until the blocking write ends. If it lands, the
//! store adopts what was written and clears the error flag, so memory
//! never disagrees with storage and later writes cannot overtake it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinError;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::Entity;
use crate::storage::JsonStorage;

/// Error flag text after a failed load
pub const LOAD_FAILED: &str = "Failed to load data";
/// Error flag text after a failed mutation
pub const SAVE_FAILED: &str = "Failed to save data";

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only view of a collection's state
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

type SharedState<T> = Arc<RwLock<CollectionSnapshot<T>>>;

fn write_state<T>(
    state: &RwLock<CollectionSnapshot<T>>,
) -> RwLockWriteGuard<'_, CollectionSnapshot<T>> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

pub struct CollectionStore<T: Entity> {
    storage: JsonStorage,
    defaults: Vec<T>,
    write_timeout: Duration,
    state: SharedState<T>,
}

impl<T: Entity> CollectionStore<T> {
    /// Create a store that has not loaded yet: `loading` is set and the
    /// defaults stand in for the data
    pub fn new(storage: JsonStorage, defaults: Vec<T>) -> Self {
        Self {
            storage,
            state: Arc::new(RwLock::new(CollectionSnapshot {
                items: defaults.clone(),
                loading: true,
                error: None,
            })),
            defaults,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Create and load in one step
    pub async fn open(storage: JsonStorage, defaults: Vec<T>, write_timeout: Duration) -> Self {
        let store = Self::new(storage, defaults).with_write_timeout(write_timeout);
        store.load().await;
        store
    }

    pub fn key(&self) -> &'static str {
        T::COLLECTION_KEY
    }

    fn state(&self) -> RwLockReadGuard<'_, CollectionSnapshot<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, CollectionSnapshot<T>> {
        write_state(&self.state)
    }

    pub fn items(&self) -> Vec<T> {
        self.state().items.clone()
    }

    pub fn snapshot(&self) -> CollectionSnapshot<T> {
        self.state().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.state().items.iter().find(|item| item.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// Load the collection from storage.
    ///
    /// Absent: the defaults are written and adopted. Unreadable, or not a
    /// JSON array of records: the defaults are used in memory only and the
    /// stored bytes are left alone.
    #[instrument(skip(self), fields(key = T::COLLECTION_KEY))]
    pub async fn load(&self) {
        let guard = self
            .storage
            .key_lock(T::COLLECTION_KEY)
            .lock_owned()
            .await;

        {
            let mut state = self.state_mut();
            state.loading = true;
            state.error = None;
        }

        let storage = self.storage.clone();
        let read = blocking(self.write_timeout, "load", move || {
            storage.read::<Vec<T>>(T::COLLECTION_KEY)
        })
        .await;

        let outcome = match read {
            Ok(Some(items)) => {
                debug!(count = items.len(), "Loaded stored collection");
                self.state_mut().items = items;
                Ok(())
            }
            Ok(None) => {
                self.state_mut().items = self.defaults.clone();
                let stored = self.persist(self.defaults.clone(), guard, LOAD_FAILED).await;
                if stored.is_ok() {
                    debug!(count = self.defaults.len(), "Stored default collection");
                }
                stored
            }
            Err(e) => {
                let mut state = self.state_mut();
                state.items = self.defaults.clone();
                state.error = Some(LOAD_FAILED.to_string());
                Err(e)
            }
        };

        if let Err(e) = &outcome {
            error!(key = T::COLLECTION_KEY, error = %e, "Failed to load data");
        }

        self.state_mut().loading = false;
    }

    /// Insert an item where the entity type places new items
    pub async fn add(&self, item: T) -> Result<()> {
        self.commit("add", move |mut items| {
            T::place(&mut items, item);
            items
        })
        .await
    }

    /// Merge a patch into the item with `id`. An unknown id leaves the
    /// sequence as it was. An invalid patch is rejected before anything
    /// is written.
    pub async fn update(&self, id: &str, patch: T::Patch) -> Result<()> {
        T::validate_patch(&patch)?;
        let id = id.to_string();
        self.commit("update", move |mut items| {
            if let Some(item) = items.iter_mut().find(|item| item.id() == id.as_str()) {
                item.apply_patch(patch);
            }
            items
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.commit("delete", move |mut items| {
            items.retain(|item| item.id() != id.as_str());
            items
        })
        .await
    }

    /// Persist the given sequence as-is
    pub async fn replace_all(&self, items: Vec<T>) -> Result<()> {
        self.commit("replace_all", move |_| items).await
    }

    /// Persist an empty sequence
    pub async fn clear_all(&self) -> Result<()> {
        self.commit("clear_all", |_| Vec::new()).await
    }

    async fn commit(&self, op: &'static str, next: impl FnOnce(Vec<T>) -> Vec<T>) -> Result<()> {
        let guard = self
            .storage
            .key_lock(T::COLLECTION_KEY)
            .lock_owned()
            .await;

        let next = next(self.items());
        let count = next.len();
        match self.persist(next, guard, SAVE_FAILED).await {
            Ok(()) => {
                debug!(key = T::COLLECTION_KEY, op, count, "Collection saved");
                Ok(())
            }
            Err(e) => {
                error!(key = T::COLLECTION_KEY, op, error = %e, "Failed to save data");
                Err(e)
            }
        }
    }

    /// Encode on the calling task, write on the blocking pool, adopt once
    /// stored. `failed` is the error flag set when the write does not
    /// complete in time or at all.
    ///
    /// The key guard is held until the write has really ended, which on
    /// a timeout is after this returns.
    async fn persist(
        &self,
        items: Vec<T>,
        guard: OwnedMutexGuard<()>,
        failed: &'static str,
    ) -> Result<()> {
        let raw = match JsonStorage::encode(&items) {
            Ok(raw) => raw,
            Err(e) => {
                self.state_mut().error = Some(failed.to_string());
                return Err(e);
            }
        };

        let storage = self.storage.clone();
        let mut write =
            tokio::task::spawn_blocking(move || storage.write_raw(T::COLLECTION_KEY, &raw));

        match tokio::time::timeout(self.write_timeout, &mut write).await {
            Ok(joined) => {
                let result = joined_result(joined, "save");
                let mut state = self.state_mut();
                match result {
                    Ok(()) => {
                        state.items = items;
                        state.error = None;
                    }
                    Err(_) => state.error = Some(failed.to_string()),
                }
                drop(state);
                drop(guard);
                result
            }
            Err(_) => {
                self.state_mut().error = Some(failed.to_string());

                let state = Arc::clone(&self.state);
                tokio::spawn(async move {
                    match joined_result(write.await, "save") {
                        Ok(()) => {
                            info!(key = T::COLLECTION_KEY, "Late write landed, adopting it");
                            let mut snapshot = write_state(&state);
                            snapshot.items = items;
                            snapshot.error = None;
                        }
                        Err(e) => {
                            warn!(key = T::COLLECTION_KEY, error = %e, "Late write failed");
                        }
                    }
                    drop(guard);
                });

                Err(timed_out("save", self.write_timeout))
            }
        }
    }
}

fn joined_result<R>(joined: std::result::Result<Result<R>, JoinError>, what: &str) -> Result<R> {
    match joined {
        Ok(result) => result,
        Err(join_error) => Err(Error::StorageUnavailable(format!(
            "{} task failed: {}",
            what, join_error
        ))),
    }
}

fn timed_out(what: &str, timeout: Duration) -> Error {
    Error::Timeout(format!("{} exceeded {} ms", what, timeout.as_millis()))
}

/// Run a storage read off the async task with a deadline. A read that
/// times out is abandoned; it changes nothing.
async fn blocking<R, F>(timeout: Duration, what: &str, job: F) -> Result<R>
where
    R: Send + 'static,
    F: FnOnce() -> Result<R> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(job)).await {
        Ok(joined) => joined_result(joined, what),
        Err(_) => Err(timed_out(what, timeout)),
    }
}
