use anyhow::Result;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::base;
use super::feed;
use super::{FetchOutcome, SkipReason, SourceAdapter, SourceKind};
use crate::config::AppConfig;

const SOURCE_ID: &str = "connect_rss";
const SOURCE_NAME: &str = "Connect Events";

static START_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time.dt-start").expect("connect start selector"));
static LOCATION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.p-location").expect("connect location selector"));

/// Adapter for the engagement platform's RSS feed. Each item's summary is an
/// HTML fragment carrying microformat markup; the machine-readable start time
/// lives on a `time.dt-start[datetime]` attribute.
pub struct ConnectRss {
    url: String,
    fallback_location: String,
    tz: Tz,
}

impl ConnectRss {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            url: config.rss_url.clone(),
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
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let url = item.link().unwrap_or_default().to_string();

            let summary = Html::parse_fragment(item.summary().unwrap_or_default());
            let raw_start = match base::first_attr(&summary, &START_SELECTOR, "datetime") {
                Some(raw) => raw,
                None => {
                    outcome.skip(Some(title), SkipReason::MissingStartAttribute);
                    continue;
                }
            };
            let start = match base::parse_iso_datetime(&raw_start, self.tz) {
                Some(start) => start,
                None => {
                    outcome.skip(Some(title), SkipReason::BadTimestamp(raw_start));
                    continue;
                }
            };

            let location = base::first_text(&summary, &LOCATION_SELECTOR);
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

impl SourceAdapter for ConnectRss {
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
        SourceKind::ConnectRss
    }

    fn fetch(&self) -> Result<FetchOutcome> {
        let body = base::fetch_body(&self.url)?;
        self.parse_feed(&body)
    }
}
