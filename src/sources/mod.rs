pub mod base;
pub mod campus_json;
pub mod connect_rss;
pub mod feed;
pub mod sports_rss;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::Event;

/// Which of the three feeds an adapter reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    CampusJson,
    ConnectRss,
    SportsRss,
}

impl SourceKind {
    pub fn all() -> [SourceKind; 3] {
        [
            SourceKind::CampusJson,
            SourceKind::ConnectRss,
            SourceKind::SportsRss,
        ]
    }
}

/// Why one feed entry was dropped instead of normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("entry has no start date field")]
    MissingStart,
    #[error("entry start date is not parseable: {0}")]
    BadTimestamp(String),
    #[error("summary has no machine-readable start time")]
    MissingStartAttribute,
    #[error("entry is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub title: Option<String>,
    pub reason: SkipReason,
}

/// What a single fetch produced: the normalized survivors plus a structured
/// record for every entry that was dropped.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub events: Vec<Event>,
    pub skipped: Vec<SkippedEntry>,
}

impl FetchOutcome {
    pub fn skip(&mut self, title: Option<String>, reason: SkipReason) {
        match &title {
            Some(title) => tracing::warn!(reason = %reason, title = %title, "skipping feed entry"),
            None => tracing::warn!(reason = %reason, "skipping feed entry"),
        }
        self.skipped.push(SkippedEntry { title, reason });
    }
}

pub trait SourceAdapter {
    fn source_id(&self) -> &'static str;
    fn source_name(&self) -> &'static str;
    fn feed_url(&self) -> &str;
    fn kind(&self) -> SourceKind;
    fn fetch(&self) -> anyhow::Result<FetchOutcome>;
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceInfo {
    pub kind: SourceKind,
    pub id: String,
    pub name: String,
    pub url: String,
}

pub fn adapter_for(kind: SourceKind, config: &AppConfig) -> Box<dyn SourceAdapter> {
    match kind {
        SourceKind::CampusJson => Box::new(campus_json::CampusJson::new(config)),
        SourceKind::ConnectRss => Box::new(connect_rss::ConnectRss::new(config)),
        SourceKind::SportsRss => Box::new(sports_rss::SportsRss::new(config)),
    }
}

pub fn list_sources(config: &AppConfig) -> Vec<SourceInfo> {
    SourceKind::all()
        .into_iter()
        .map(|kind| {
            let adapter = adapter_for(kind, config);
            SourceInfo {
                kind,
                id: adapter.source_id().to_string(),
                name: adapter.source_name().to_string(),
                url: adapter.feed_url().to_string(),
            }
        })
        .collect()
}

/// Run one adapter, converting total failure into an empty outcome. No error
/// escapes to the interactive session.
pub fn run(adapter: &dyn SourceAdapter) -> FetchOutcome {
    match adapter.fetch() {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(source = adapter.source_id(), "fetch failed: {err:#}");
            FetchOutcome::default()
        }
    }
}
