use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{Person, SlotKey};

/// Outcome of an add attempt, surfaced to the notification layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// The slot assignment map: (day, period) -> people placed in that cell.
///
/// Derived, volatile state. It is rebuilt empty whenever a new pool is loaded
/// and carries no meaning across pools. Within one slot's list, person ids are
/// unique and insertion order is preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotAssignments {
    slots: HashMap<SlotKey, Vec<Person>>,
}

impl SlotAssignments {
    pub fn new() -> Self {
        SlotAssignments::default()
    }

    /// Adds a person to a slot, creating the slot list on demand.
    ///
    /// A person already present in the slot (same id) is rejected without
    /// mutation, so repeated identical calls are a no-op after the first.
    /// Deliberately does not consult the conflict check; callers warn about
    /// conflicts separately and may still place the person.
    pub fn add(&mut self, day: u8, period: u8, person: Person) -> AddOutcome {
        let list = self.slots.entry(SlotKey::new(day, period)).or_default();

        if list.iter().any(|p| p.id == person.id) {
            return AddOutcome::Duplicate;
        }

        list.push(person);
        AddOutcome::Added
    }

    /// Removes any entry with the given id from a slot.
    ///
    /// A missing slot, or a slot that never contained the person, is a silent
    /// no-op rather than an error.
    pub fn remove(&mut self, day: u8, period: u8, person_id: &str) {
        if let Some(list) = self.slots.get_mut(&SlotKey::new(day, period)) {
            list.retain(|p| p.id != person_id);
        }
    }

    pub fn get(&self, day: u8, period: u8) -> Option<&[Person]> {
        self.slots
            .get(&SlotKey::new(day, period))
            .map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &Vec<Person>)> {
        self.slots.iter()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.values().all(|v| v.is_empty())
    }

    /// Total number of placements across all slots.
    pub fn assigned_count(&self) -> usize {
        self.slots.values().map(|v| v.len()).sum()
    }
}
