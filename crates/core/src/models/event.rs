//! Event model for the community calendar

use serde::{Deserialize, Serialize};

use super::{check_patch_text, next_id, parse_date, require, require_date, Entity};
use crate::error::Result;

const REQUIRED_FIELDS: &str = "Please fill in all required fields";

/// A calendar event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// ISO date (`YYYY-MM-DD`)
    pub date: String,
    /// Free text, e.g. "7:30 PM"
    pub time: String,
    pub description: String,
}

/// Event form input, before an id is assigned
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title, REQUIRED_FIELDS)?;
        require("date", &self.date, REQUIRED_FIELDS)?;
        require("time", &self.time, REQUIRED_FIELDS)?;
        require("description", &self.description, REQUIRED_FIELDS)?;
        require_date("date", &self.date)?;
        Ok(())
    }

    pub fn into_entity(self) -> Result<Event> {
        self.validate()?;
        Ok(Event {
            id: next_id(),
            title: self.title,
            date: self.date,
            time: self.time,
            description: self.description,
        })
    }
}

/// Partial update for an event
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
}

impl Entity for Event {
    type Patch = EventPatch;

    const COLLECTION_KEY: &'static str = "events";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &EventPatch) -> Result<()> {
        check_patch_text("title", patch.title.as_ref())?;
        check_patch_text("time", patch.time.as_ref())?;
        check_patch_text("description", patch.description.as_ref())?;
        if let Some(date) = &patch.date {
            require_date("date", date)?;
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    /// Events stay in ascending date order after every insert.
    /// Undated or malformed entries sink to the end.
    fn place(items: &mut Vec<Self>, item: Self) {
        items.push(item);
        items.sort_by_key(|e| {
            let date = parse_date(&e.date);
            (date.is_none(), date)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn event(id: &str, date: &str) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {}", id),
            date: date.to_string(),
            time: "7:30 PM".to_string(),
            description: "Weekly study".to_string(),
        }
    }

    #[test]
    fn test_place_sorts_by_date() {
        let mut items = vec![event("1", "2024-01-13"), event("2", "2024-02-23")];
        Event::place(&mut items, event("3", "2024-01-16"));

        let ids: Vec<&str> = items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[test]
    fn test_place_puts_malformed_dates_last() {
        let mut items = vec![event("1", "not a date")];
        Event::place(&mut items, event("2", "2024-01-01"));
        assert_eq!(items[0].id, "2");
        assert_eq!(items[1].id, "1");
    }

    #[test]
    fn test_all_fields_required() {
        let input = NewEvent {
            title: "Purim Celebration".to_string(),
            date: "2024-02-23".to_string(),
            time: String::new(),
            description: "Megillah reading".to_string(),
        };
        assert!(matches!(
            input.validate(),
            Err(Error::Validation { field: "time", .. })
        ));
    }

    #[test]
    fn test_patch_with_bad_date_rejected() {
        let patch = EventPatch {
            date: Some("someday".to_string()),
            ..Default::default()
        };
        assert!(Event::validate_patch(&patch).is_err());
    }
}
