use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::models::Event;

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn fetch_body(url: &str) -> Result<String> {
    static CLIENT: Lazy<Client> = Lazy::new(|| {
        Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent("CampusEvents/0.1 (+https://github.com/mike/campus-events)")
            .build()
            .expect("http client")
    });

    let response = CLIENT
        .get(url)
        .send()
        .with_context(|| format!("request failed for {url}"))?;
    let response = response
        .error_for_status()
        .with_context(|| format!("non-success status for {url}"))?;
    response
        .text()
        .with_context(|| format!("unable to read response body for {url}"))
}

/// Parse an ISO-8601 timestamp and convert it to the target zone.
///
/// Accepts offsets (`2025-05-15T09:00:00-04:00`), UTC with long fractional
/// seconds (`2025-04-15T18:00:00.0000000Z`), and naive local timestamps,
/// which are interpreted in the target zone.
pub fn parse_iso_datetime(raw: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(to_target_offset(dt.with_timezone(&tz)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return match tz.from_local_datetime(&naive) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                    Some(to_target_offset(dt))
                }
                LocalResult::None => None,
            };
        }
    }
    None
}

fn to_target_offset(dt: DateTime<Tz>) -> DateTime<FixedOffset> {
    dt.fixed_offset()
}

/// Pull the text of the first match for `selector` out of a parsed fragment.
pub fn first_text(fragment: &Html, selector: &Selector) -> Option<String> {
    fragment.select(selector).next().and_then(|node| {
        let text = clean_text(&node.text().collect::<Vec<_>>().join(" "));
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    })
}

pub fn first_attr(fragment: &Html, selector: &Selector, attr: &str) -> Option<String> {
    fragment
        .select(selector)
        .next()
        .and_then(|node| node.value().attr(attr))
        .map(str::to_string)
}

/// Decode HTML character references in a bare string (feed titles arrive
/// XML-unescaped but may still carry `&amp;`-style HTML entities).
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return clean_text(input);
    }
    let fragment = Html::parse_fragment(input);
    clean_text(&fragment.root_element().text().collect::<Vec<_>>().join(""))
}

pub fn build_event(
    source_id: &str,
    title: String,
    start: DateTime<FixedOffset>,
    location: Option<String>,
    url: String,
    fallback_location: &str,
) -> Event {
    let location = location
        .map(|loc| clean_text(&loc))
        .filter(|loc| !loc.is_empty())
        .unwrap_or_else(|| fallback_location.to_string());
    Event {
        source: source_id.to_string(),
        title: clean_text(&title),
        start,
        location,
        url: url.trim().to_string(),
        tags: Vec::new(),
    }
}
