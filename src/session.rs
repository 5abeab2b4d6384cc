use std::collections::HashMap;

use chrono::Utc;

use crate::config::{AppConfig, ConfigStore};
use crate::filter;
use crate::merge;
use crate::models::{Event, EventKey};
use crate::render;
use crate::selection::SelectionStore;
use crate::sources::{self, FetchOutcome, SkippedEntry, SourceInfo, SourceKind};

/// File name the display layer should offer for the exported HTML.
pub const EXPORT_FILE_NAME: &str = "selected-events.html";

/// One stateful toggle for the display layer: a label to show and the current
/// selection flag, keyed by the event's identity.
#[derive(Debug, Clone)]
pub struct ToggleRow {
    pub key: EventKey,
    pub label: String,
    pub selected: bool,
}

/// Drives one interactive selection session: fetches each source at most once
/// (session-lifetime cache), applies the filter pipeline, accumulates toggle
/// state across source switches, and produces the merged newsletter HTML.
pub struct Session {
    config: AppConfig,
    active: SourceKind,
    query: String,
    future_only: bool,
    cache: HashMap<SourceKind, FetchOutcome>,
    selection: SelectionStore,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            active: SourceKind::CampusJson,
            query: String::new(),
            future_only: false,
            cache: HashMap::new(),
            selection: SelectionStore::new(),
        }
    }

    /// Build a session from the persisted config file (or its defaults).
    pub fn load() -> Self {
        Self::new(ConfigStore::load().read())
    }

    pub fn sources(&self) -> Vec<SourceInfo> {
        sources::list_sources(&self.config)
    }

    pub fn active_source(&self) -> SourceKind {
        self.active
    }

    /// Switching sources never touches the selection store.
    pub fn set_active_source(&mut self, kind: SourceKind) {
        self.active = kind;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn set_future_only(&mut self, enabled: bool) {
        self.future_only = enabled;
    }

    /// The filtered, sorted view of the active source, registered into the
    /// selection store and shaped for the display layer.
    pub fn visible_rows(&mut self) -> Vec<ToggleRow> {
        let mut events = self.fetched(self.active).events.clone();

        if self.active == SourceKind::CampusJson {
            events = filter::by_location(&events, &self.config.target_location);
        }
        events = filter::by_title(&events, &self.query);
        if self.future_only {
            let now = Utc::now().with_timezone(&self.config.target_tz()).fixed_offset();
            events = filter::future_only(&events, now);
        }
        events.sort_by_key(|event| event.start);

        events
            .into_iter()
            .map(|event| {
                let key = event.identity_key();
                let label = row_label(&event);
                self.selection.register(key.clone(), event);
                let selected = self.selection.is_selected(&key);
                ToggleRow {
                    key,
                    label,
                    selected,
                }
            })
            .collect()
    }

    /// Toggle callback from the display layer.
    pub fn set_selected(&mut self, key: &EventKey, selected: bool) {
        self.selection.set_selected(key, selected);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_all();
    }

    pub fn selected_events(&self) -> Vec<Event> {
        self.selection.selected_events()
    }

    /// The merged, deduplicated newsletter markup for the current selection.
    pub fn newsletter_html(&self) -> String {
        render::render(&merge::dedup_selected(&self.selection.selected_events()))
    }

    /// Export is only offered while the microformat RSS source is active; the
    /// other feeds' location data is not trusted for the newsletter.
    pub fn can_export(&self) -> bool {
        self.active == SourceKind::ConnectRss
    }

    /// Structured skip records from the cached fetch of a source, if any.
    pub fn skipped_for(&self, kind: SourceKind) -> Option<&[SkippedEntry]> {
        self.cache.get(&kind).map(|outcome| outcome.skipped.as_slice())
    }

    fn fetched(&mut self, kind: SourceKind) -> &FetchOutcome {
        if !self.cache.contains_key(&kind) {
            let adapter = sources::adapter_for(kind, &self.config);
            let outcome = sources::run(adapter.as_ref());
            self.cache.insert(kind, outcome);
        }
        &self.cache[&kind]
    }

    #[cfg(test)]
    pub(crate) fn seed_fetched(&mut self, kind: SourceKind, outcome: FetchOutcome) {
        self.cache.insert(kind, outcome);
    }
}

fn row_label(event: &Event) -> String {
    format!(
        "{} – {} ({}, {})",
        event.start.format("%A, %B %d"),
        event.title,
        render::format_time(event),
        event.location
    )
}
