//! Data models for the noticeboard collections

mod announcement;
mod event;
mod gallery;

pub use announcement::*;
pub use event::*;
pub use gallery::*;

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// A record that lives in a persisted collection.
///
/// Each entity type names the storage key of its collection, knows how to
/// merge a typed patch into itself and decides where a newly added item
/// lands in the sequence.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Partial update applied by [`crate::CollectionStore::update`]
    type Patch: Send + 'static;

    /// Storage key of the collection
    const COLLECTION_KEY: &'static str;

    fn id(&self) -> &str;

    /// Check a patch before it is merged
    fn validate_patch(patch: &Self::Patch) -> Result<()>;

    /// Merge the supplied fields into this record
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Insert a new item into the sequence.
    ///
    /// Newest-created first unless the entity type overrides it.
    fn place(items: &mut Vec<Self>, item: Self) {
        items.insert(0, item);
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a timestamp-derived identifier.
///
/// Milliseconds since the epoch, bumped by one when two calls land in the
/// same millisecond so ids stay unique within the process.
pub fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn require(field: &'static str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, message));
    }
    Ok(())
}

fn require_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| Error::validation(field, "Please select a valid date"))
}

/// Supplied patch fields must not be blank
fn check_patch_text(field: &'static str, value: Option<&String>) -> Result<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(Error::validation(
            field,
            format!("{} must not be empty", field),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_is_strictly_increasing() {
        let ids: Vec<i64> = (0..100).map(|_| next_id().parse().unwrap()).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "{} should be greater than {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-12"),
            NaiveDate::from_ymd_opt(2024, 1, 12)
        );
        assert!(parse_date("12/01/2024").is_none());
        assert!(parse_date("").is_none());
    }
}
