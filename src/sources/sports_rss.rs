use anyhow::Result;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use super::base;
use super::feed;
use super::{FetchOutcome, SkipReason, SourceAdapter, SourceKind};
use crate::config::AppConfig;

const SOURCE_ID: &str = "sports_rss";
const SOURCE_NAME: &str = "Knights Athletics";

// Feed titles look like "5/15 6:00 PM [W] Soccer vs Butler".
static DATE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d{1,2}/\d{1,2}(\s+\d{1,2}:\d{2}\s*(?i:[AP]M))?\s*")
        .expect("sports date prefix regex")
});
static TAG_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[A-Za-z]+\]\s*").expect("sports tag token regex"));

/// Adapter for the athletics calendar RSS feed, which carries custom
/// `ev:`-namespaced fields for the start time and location.
pub struct SportsRss {
    url: String,
    fallback_location: String,
    tz: Tz,
}

impl SportsRss {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            url: config.sports_rss_url.clone(),
            fallback_location: config.target_location.clone(),
            tz: config.target_tz(),
        }
    }

    pub(crate) fn parse_feed(&self, body: &str) -> Result<FetchOutcome> {
        let items = feed::parse_items(body)?;
        let mut outcome = FetchOutcome::default();

        for item in items {
            let title = item
                .title()
                .map(base::decode_entities)
                .map(|t| clean_title(&t))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let url = item.link().unwrap_or_default().to_string();

            let raw_start = item
                .field("localstartdate")
                .or_else(|| item.field("startdate"));
            let raw_start = match raw_start {
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

            let location = item.field("location").map(str::to_string);
            outcome.events.push(base::build_event(
                SOURCE_ID,
                title,
                start,
                location,
                url,
                &self.fallback_location,
            ));
        }

        Ok(outcome)
    }
}

fn clean_title(title: &str) -> String {
    let stripped = DATE_PREFIX_RE.replace(title, "");
    let stripped = TAG_TOKEN_RE.replace_all(&stripped, "");
    base::clean_text(&stripped)
}

impl SourceAdapter for SportsRss {
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
        SourceKind::SportsRss
    }

    fn fetch(&self) -> Result<FetchOutcome> {
        let body = base::fetch_body(&self.url)?;
        self.parse_feed(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
    <rss version="2.0" xmlns:ev="http://purl.org/rss/1.0/modules/event/">
      <channel>
        <title>Knights Athletics Calendar</title>
        <item>
          <title>5/15 6:00 PM [W] Soccer vs Butler</title>
          <link>https://muknights.com/events/soccer-butler</link>
          <ev:location>St. Vincent Field</ev:location>
          <ev:localstartdate>2025-05-15T18:00:00</ev:localstartdate>
          <ev:startdate>2025-05-15T22:00:00.0000000Z</ev:startdate>
        </item>
        <item>
          <title>5/17 [JV] Baseball at Anderson</title>
          <link>https://muknights.com/events/baseball-anderson</link>
          <ev:startdate>2025-05-17T17:00:00.0000000Z</ev:startdate>
        </item>
        <item>
          <title>Golf Invitational</title>
          <link>https://muknights.com/events/golf</link>
        </item>
      </channel>
    </rss>"#;

    fn adapter() -> SportsRss {
        SportsRss::new(&AppConfig::default())
    }

    #[test]
    fn strips_date_prefix_and_tag_tokens_from_titles() {
        assert_eq!(clean_title("5/15 6:00 PM [W] Soccer vs Butler"), "Soccer vs Butler");
        assert_eq!(clean_title("5/17 [JV] Baseball at Anderson"), "Baseball at Anderson");
        assert_eq!(clean_title("12/3 Basketball vs Marian"), "Basketball vs Marian");
        assert_eq!(clean_title("Golf Invitational"), "Golf Invitational");
    }

    #[test]
    fn prefers_local_start_over_utc_start() {
        let outcome = adapter().parse_feed(SAMPLE_RSS).expect("parse feed");
        let soccer = &outcome.events[0];
        assert_eq!(soccer.title, "Soccer vs Butler");
        // The local field is naive and already in Eastern wall time.
        assert_eq!(soccer.start.hour(), 18);
        assert_eq!(soccer.location, "St. Vincent Field");
    }

    #[test]
    fn falls_back_to_utc_start_and_converts() {
        let outcome = adapter().parse_feed(SAMPLE_RSS).expect("parse feed");
        let baseball = &outcome.events[1];
        // 17:00 UTC on an EDT date is 1:00 PM Eastern.
        assert_eq!(baseball.start.hour(), 13);
        assert_eq!(baseball.location, "Indianapolis");
    }

    #[test]
    fn item_without_any_start_field_is_skipped() {
        let outcome = adapter().parse_feed(SAMPLE_RSS).expect("parse feed");
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].title.as_deref(), Some("Golf Invitational"));
        assert_eq!(outcome.skipped[0].reason, SkipReason::MissingStart);
    }
}
