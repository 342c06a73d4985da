//! Announcement model for the bulletin board

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_patch_text, next_id, require, require_date, Entity};
use crate::error::{Error, Result};

/// Announcements dated before this are rejected by the form rules
pub const EARLIEST_ANNOUNCEMENT_DATE: &str = "2020-01-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A bulletin board announcement
///
/// Stored records are taken as they are: a missing field decodes to its
/// default instead of rejecting the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    /// ISO date (`YYYY-MM-DD`)
    pub date: String,
    pub priority: Priority,
}

/// Announcement form input, before an id is assigned
#[derive(Debug, Clone, Default)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub date: String,
    pub priority: Priority,
}

impl NewAnnouncement {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title, "Title is required")?;
        require("content", &self.content, "Content is required")?;
        require("date", &self.date, "Date is required")?;
        check_date_floor(&self.date)?;
        Ok(())
    }

    /// Validate and build the announcement with a fresh id
    pub fn into_entity(self) -> Result<Announcement> {
        self.validate()?;
        Ok(Announcement {
            id: next_id(),
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            date: self.date,
            priority: self.priority,
        })
    }
}

/// Partial update for an announcement
#[derive(Debug, Clone, Default)]
pub struct AnnouncementPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub priority: Option<Priority>,
}

fn check_date_floor(date: &str) -> Result<NaiveDate> {
    let parsed = require_date("date", date)?;
    let floor = require_date("date", EARLIEST_ANNOUNCEMENT_DATE)?;
    if parsed < floor {
        return Err(Error::validation("date", "Please select a valid date"));
    }
    Ok(parsed)
}

impl Entity for Announcement {
    type Patch = AnnouncementPatch;

    const COLLECTION_KEY: &'static str = "announcements";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &AnnouncementPatch) -> Result<()> {
        check_patch_text("title", patch.title.as_ref())?;
        check_patch_text("content", patch.content.as_ref())?;
        if let Some(date) = &patch.date {
            check_date_floor(date)?;
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: AnnouncementPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}
