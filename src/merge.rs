use std::collections::HashMap;

use crate::models::{Event, EventKey};

// Lower rank wins; first substring match against the event URL decides.
const DOMAIN_PRIORITY: &[(&str, usize)] = &[
    ("connect.marian.edu", 1),
    ("muknights.com", 2),
    ("www.marian.edu", 3),
];

pub fn source_rank(url: &str) -> usize {
    for (domain, rank) in DOMAIN_PRIORITY {
        if url.contains(domain) {
            return *rank;
        }
    }
    usize::MAX
}

/// Collapse events sharing a merge key (title + start), keeping the copy from
/// the highest-priority source. A later duplicate replaces the incumbent only
/// when its rank is strictly lower, so equal-priority copies keep the
/// first-seen one. Output preserves first-encounter order of merge keys.
pub fn dedup_selected(events: &[Event]) -> Vec<Event> {
    let mut champions: Vec<Event> = Vec::new();
    let mut by_key: HashMap<EventKey, usize> = HashMap::new();

    for event in events {
        let key = event.merge_key();
        match by_key.get(&key) {
            None => {
                by_key.insert(key, champions.len());
                champions.push(event.clone());
            }
            Some(&index) => {
                if source_rank(&champions[index].url) > source_rank(&event.url) {
                    champions[index] = event.clone();
                }
            }
        }
    }

    champions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn event(title: &str, start: &str, url: &str) -> Event {
        Event {
            source: String::new(),
            title: title.to_string(),
            start: DateTime::parse_from_rfc3339(start).expect("valid start"),
            location: "Indianapolis".to_string(),
            url: url.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn ranks_follow_the_domain_table() {
        assert_eq!(source_rank("https://connect.marian.edu/event/x"), 1);
        assert_eq!(source_rank("https://muknights.com/events/y"), 2);
        assert_eq!(source_rank("https://www.marian.edu/events/z"), 3);
        assert_eq!(source_rank("https://elsewhere.example.com/a"), usize::MAX);
        assert_eq!(source_rank(""), usize::MAX);
    }

    #[test]
    fn duplicate_keeps_the_higher_priority_source() {
        let sports = event(
            "Chapel Service",
            "2025-05-15T09:00:00-04:00",
            "https://muknights.com/y",
        );
        let connect = event(
            "Chapel Service",
            "2025-05-15T09:00:00-04:00",
            "https://connect.marian.edu/x",
        );

        // Winner is the same regardless of encounter order.
        for ordering in [vec![sports.clone(), connect.clone()], vec![connect.clone(), sports]] {
            let merged = dedup_selected(&ordering);
            assert_eq!(merged.len(), 1);
            assert_eq!(merged[0].url, "https://connect.marian.edu/x");
        }
    }

    #[test]
    fn equal_ranks_keep_the_first_seen_copy() {
        let first = event(
            "Open House",
            "2025-05-20T10:00:00-04:00",
            "https://elsewhere.example.com/one",
        );
        let second = event(
            "Open House",
            "2025-05-20T10:00:00-04:00",
            "https://elsewhere.example.com/two",
        );
        let merged = dedup_selected(&[first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "https://elsewhere.example.com/one");
    }

    #[test]
    fn distinct_starts_never_merge() {
        let morning = event(
            "Chapel Service",
            "2025-05-15T09:00:00-04:00",
            "https://connect.marian.edu/x",
        );
        let evening = event(
            "Chapel Service",
            "2025-05-15T19:00:00-04:00",
            "https://muknights.com/y",
        );
        assert_eq!(dedup_selected(&[morning, evening]).len(), 2);
    }
}
