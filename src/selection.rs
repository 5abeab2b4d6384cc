use std::collections::HashMap;

use crate::models::{Event, EventKey};

#[derive(Debug, Clone)]
struct Slot {
    event: Event,
    selected: bool,
}

/// Session-scoped toggle state, keyed by event identity. Slots accumulate
/// across source switches and are never deleted within a session, so a
/// selection made under one source survives visits to the others.
#[derive(Debug, Default)]
pub struct SelectionStore {
    slots: HashMap<EventKey, Slot>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the payload for a key without touching its selected flag.
    pub fn register(&mut self, key: EventKey, event: Event) {
        self.slots
            .entry(key)
            .and_modify(|slot| slot.event = event.clone())
            .or_insert(Slot {
                event,
                selected: false,
            });
    }

    /// No-op for keys that were never registered.
    pub fn set_selected(&mut self, key: &EventKey, selected: bool) {
        if let Some(slot) = self.slots.get_mut(key) {
            slot.selected = selected;
        }
    }

    pub fn is_selected(&self, key: &EventKey) -> bool {
        self.slots.get(key).map(|slot| slot.selected) == Some(true)
    }

    /// Payloads for every selected key, in unspecified order.
    pub fn selected_events(&self) -> Vec<Event> {
        self.slots
            .values()
            .filter(|slot| slot.selected)
            .map(|slot| slot.event.clone())
            .collect()
    }

    /// Deselect everything while keeping the registered payloads.
    pub fn clear_all(&mut self) {
        for slot in self.slots.values_mut() {
            slot.selected = false;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
