//! Built-in content written on first run

use crate::models::{Announcement, Event, GalleryImage, Priority};

fn announcement(id: &str, title: &str, content: &str, date: &str, priority: Priority) -> Announcement {
    Announcement {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        date: date.to_string(),
        priority,
    }
}

fn event(id: &str, title: &str, date: &str, time: &str, description: &str) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        description: description.to_string(),
    }
}

fn image(id: &str, url: &str, alt: &str, title: &str) -> GalleryImage {
    GalleryImage {
        id: id.to_string(),
        url: url.to_string(),
        alt: alt.to_string(),
        title: title.to_string(),
    }
}

pub fn announcements() -> Vec<Announcement> {
    vec![
        announcement(
            "1",
            "Shabbat Shalom!",
            "Join us for services this Shabbat. Services begin at 9:00 AM followed by a delightful Kiddush lunch.",
            "2024-01-12",
            Priority::High,
        ),
        announcement(
            "2",
            "Weekly Torah Study",
            "Every Tuesday at 7:30 PM in the Main Sanctuary. All are welcome to study Parsha Vayikra.",
            "2024-01-15",
            Priority::Medium,
        ),
        announcement(
            "3",
            "Community Seder Preparations",
            "We are preparing for a beautiful community Passover Seder. Volunteers needed for setup and cooking.",
            "2024-01-20",
            Priority::Medium,
        ),
    ]
}

pub fn events() -> Vec<Event> {
    vec![
        event(
            "1",
            "Shabbat Services",
            "2024-01-13",
            "9:00 AM",
            "Traditional Orthodox Shabbat morning services followed by Kiddush lunch.",
        ),
        event(
            "2",
            "Torah Study",
            "2024-01-16",
            "7:30 PM",
            "Weekly Torah study session focusing on the weekly portion.",
        ),
        event(
            "3",
            "Purim Celebration",
            "2024-02-23",
            "6:00 PM",
            "Community Purim celebration with Megillah reading and festive meal.",
        ),
    ]
}

pub fn gallery_images() -> Vec<GalleryImage> {
    vec![
        image(
            "1",
            "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=500&h=300&fit=crop",
            "Synagogue Exterior",
            "Our Beautiful Synagogue",
        ),
        image(
            "2",
            "https://images.unsplash.com/photo-1544551763-46a013bb70d5?w=500&h=300&fit=crop",
            "Torah Scroll",
            "Sacred Torah Scrolls",
        ),
        image(
            "3",
            "https://images.unsplash.com/photo-1580870069867-74c57ee1bb07?w=500&h=300&fit=crop",
            "Prayer Service",
            "Community Prayer",
        ),
    ]
}
