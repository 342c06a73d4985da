//! One-way JSON snapshot of every collection, for admin backups

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Announcement, Event, GalleryImage};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub announcements: Vec<Announcement>,
    pub images: Vec<GalleryImage>,
    pub events: Vec<Event>,
    #[serde(serialize_with = "rfc3339_millis")]
    pub export_date: DateTime<Utc>,
}

fn rfc3339_millis<S: serde::Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl ExportSnapshot {
    pub fn new(
        announcements: Vec<Announcement>,
        images: Vec<GalleryImage>,
        events: Vec<Event>,
    ) -> Self {
        Self {
            announcements,
            images,
            events,
            export_date: Utc::now(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested download name, e.g. `noticeboard-data-2024-01-12.json`
    pub fn file_name(&self) -> String {
        format!("noticeboard-data-{}.json", self.export_date.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::TimeZone;

    #[test]
    fn test_export_shape() {
        let mut snapshot =
            ExportSnapshot::new(seed::announcements(), seed::gallery_images(), Vec::new());
        snapshot.export_date = Utc.with_ymd_and_hms(2024, 1, 12, 8, 30, 0).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();

        assert_eq!(value["announcements"].as_array().unwrap().len(), 3);
        assert_eq!(value["images"].as_array().unwrap().len(), 3);
        assert_eq!(value["events"], serde_json::json!([]));
        assert_eq!(value["exportDate"], "2024-01-12T08:30:00.000Z");
        assert_eq!(value["announcements"][0]["priority"], "high");
        assert_eq!(snapshot.file_name(), "noticeboard-data-2024-01-12.json");
    }
}
