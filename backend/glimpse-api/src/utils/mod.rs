use chrono::{DateTime, Utc};

/// Compact relative-time label for a post or comment timestamp:
/// "Just now", then minutes, hours, days.
pub fn relative_time(timestamp: Option<DateTime<Utc>>) -> String {
    relative_time_at(timestamp, Utc::now())
}

pub fn relative_time_at(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(posted) = timestamp else {
        return String::new();
    };
    let minutes = (now - posted).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h");
    }
    format!("{}d", hours / 24)
}
