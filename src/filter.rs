use chrono::{DateTime, FixedOffset};

use crate::models::Event;

/// Keep events whose tag list contains the target location verbatim. Only the
/// campus JSON source carries tags; the session applies this filter to that
/// source alone.
pub fn by_location(events: &[Event], target: &str) -> Vec<Event> {
    events
        .iter()
        .filter(|event| event.tags.iter().any(|tag| tag == target))
        .cloned()
        .collect()
}

/// Case-insensitive substring match against the title. An empty or
/// whitespace-only query keeps everything.
pub fn by_title(events: &[Event], query: &str) -> Vec<Event> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|event| event.title.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Keep events starting at or after `now`.
pub fn future_only(events: &[Event], now: DateTime<FixedOffset>) -> Vec<Event> {
    events
        .iter()
        .filter(|event| event.start >= now)
        .cloned()
        .collect()
}
