use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde_json::Value;

use super::base;
use super::{FetchOutcome, SkipReason, SourceAdapter, SourceKind};
use crate::config::AppConfig;

const SOURCE_ID: &str = "campus_json";
const SOURCE_NAME: &str = "Campus Events";

/// Adapter for the campus website's JSON event feed. Entries are free-form
/// objects; they are normalized to the common schema here, immediately after
/// the fetch, and carry their `filter2` tag list so the location filter can
/// run downstream on normalized records.
pub struct CampusJson {
    url: String,
    fallback_location: String,
    tz: Tz,
}

impl CampusJson {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            url: config.json_url.clone(),
            fallback_location: config.target_location.clone(),
            tz: config.target_tz(),
        }
    }

    pub(crate) fn parse_payload(&self, body: &str) -> Result<FetchOutcome> {
        let payload: Value = serde_json::from_str(body).context("campus feed is not JSON")?;
        let entries = payload
            .get("events")
            .and_then(Value::as_array)
            .context("campus feed has no events array")?;

        let mut outcome = FetchOutcome::default();
        for entry in entries {
            let record = match entry.as_object() {
                Some(record) => record,
                None => {
                    outcome.skip(None, SkipReason::NotAnObject);
                    continue;
                }
            };

            let title = record
                .get("title")
                .and_then(Value::as_str)
                .map(base::decode_entities)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());

            let raw_start = match record.get("startDate").and_then(Value::as_str) {
                Some(raw) if !raw.trim().is_empty() => raw,
                _ => {
                    outcome.skip(Some(title), SkipReason::MissingStart);
                    continue;
                }
            };
            let start = match base::parse_iso_datetime(raw_start, self.tz) {
                Some(start) => start,
                None => {
                    outcome.skip(Some(title), SkipReason::BadTimestamp(raw_start.to_string()));
                    continue;
                }
            };

            let location = record
                .get("location")
                .and_then(Value::as_str)
                .map(str::to_string);
            let url = record
                .get("url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let tags = record
                .get("filter2")
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let mut event = base::build_event(
                SOURCE_ID,
                title,
                start,
                location,
                url,
                &self.fallback_location,
            );
            event.tags = tags;
            outcome.events.push(event);
        }

        Ok(outcome)
    }
}

impl SourceAdapter for CampusJson {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn feed_url(&self) -> &str {
        &self.url
    }

    fn kind(&self) -> SourceKind {
        SourceKind::CampusJson
    }

    fn fetch(&self) -> Result<FetchOutcome> {
        let body = base::fetch_body(&self.url)?;
        self.parse_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE_JSON: &str = r#"{
        "events": [
            {
                "title": "Chapel Service",
                "startDate": "2025-05-15T09:00:00-04:00",
                "location": "Bishop Chartrand Memorial Chapel",
                "url": "https://www.marian.edu/events/chapel",
                "filter2": ["Indianapolis", "Faith"]
            },
            {
                "title": "Online Info Session",
                "startDate": "2025-05-16T12:00:00-04:00",
                "url": "https://www.marian.edu/events/info",
                "filter2": ["Virtual"]
            },
            {
                "title": "Dateless Gathering",
                "filter2": ["Indianapolis"]
            },
            {
                "title": "Broken Clock Social",
                "startDate": "sometime in May",
                "filter2": ["Indianapolis"]
            },
            "not an event"
        ]
    }"#;

    fn adapter() -> CampusJson {
        CampusJson::new(&AppConfig::default())
    }

    #[test]
    fn normalizes_entries_and_keeps_tags() {
        let outcome = adapter().parse_payload(SAMPLE_JSON).expect("parse json");
        assert_eq!(outcome.events.len(), 2);

        let chapel = &outcome.events[0];
        assert_eq!(chapel.title, "Chapel Service");
        assert_eq!(chapel.start.hour(), 9);
        assert_eq!(chapel.location, "Bishop Chartrand Memorial Chapel");
        assert_eq!(chapel.tags, vec!["Indianapolis", "Faith"]);

        // Missing location falls back to the configured target location.
        assert_eq!(outcome.events[1].location, "Indianapolis");
    }

    #[test]
    fn dropped_entries_produce_one_skip_record_each() {
        let outcome = adapter().parse_payload(SAMPLE_JSON).expect("parse json");
        assert_eq!(outcome.skipped.len(), 3);
        assert_eq!(outcome.skipped[0].reason, SkipReason::MissingStart);
        assert_eq!(outcome.skipped[0].title.as_deref(), Some("Dateless Gathering"));
        assert!(matches!(outcome.skipped[1].reason, SkipReason::BadTimestamp(_)));
        assert_eq!(outcome.skipped[2].reason, SkipReason::NotAnObject);
    }

    #[test]
    fn missing_events_array_is_a_fetch_level_error() {
        assert!(adapter().parse_payload(r#"{"data": []}"#).is_err());
        assert!(adapter().parse_payload("not json").is_err());
    }
}
