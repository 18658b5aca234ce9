pub mod assignments;
pub mod conflict;
pub mod types;

use serde::{Deserialize, Serialize};

pub use assignments::{AddOutcome, SlotAssignments};
pub use conflict::check_conflict;
pub use types::{ConflictCheck, Person, ScheduleEntry, SlotKey};

pub const DEFAULT_WEEK: u32 = 1;

/// The whole scheduling workbench state: the loaded person pool, the slot
/// assignment map derived from it, and the week currently being viewed.
///
/// All mutation goes through these methods; callers never reach into the
/// fields to edit them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerState {
    pool: Vec<Person>,
    assignments: SlotAssignments,
    current_week: u32,
}

impl Default for SchedulerState {
    fn default() -> Self {
        SchedulerState {
            pool: Vec::new(),
            assignments: SlotAssignments::new(),
            current_week: DEFAULT_WEEK,
        }
    }
}

impl SchedulerState {
    pub fn new() -> Self {
        SchedulerState::default()
    }

    /// Replaces the pool with a freshly parsed batch and returns its size.
    ///
    /// Existing assignments reference people from the old pool, so they are
    /// always cleared here, never carried over.
    pub fn load_pool(&mut self, people: Vec<Person>) -> usize {
        let count = people.len();
        self.pool = people;
        self.assignments.clear();
        count
    }

    /// Clears pool and assignments and returns the viewed week to 1.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.assignments.clear();
        self.current_week = DEFAULT_WEEK;
    }

    pub fn pool(&self) -> &[Person] {
        &self.pool
    }

    pub fn find_person(&self, id: &str) -> Option<&Person> {
        self.pool.iter().find(|p| p.id == id)
    }

    pub fn assignments(&self) -> &SlotAssignments {
        &self.assignments
    }

    pub fn assign(&mut self, day: u8, period: u8, person: Person) -> AddOutcome {
        self.assignments.add(day, period, person)
    }

    pub fn unassign(&mut self, day: u8, period: u8, person_id: &str) {
        self.assignments.remove(day, period, person_id);
    }

    pub fn current_week(&self) -> u32 {
        self.current_week
    }

    /// Display-only: changes which week callers filter views by. Stored data
    /// is untouched.
    pub fn set_current_week(&mut self, week: u32) {
        self.current_week = week;
    }

    /// Convenience wrapper over [`check_conflict`] that resolves the person
    /// from the pool by id.
    pub fn check_conflict_by_id(&self, person_id: &str, day: u8, period: u8, week: u32) -> ConflictCheck {
        check_conflict(self.find_person(person_id), day, period, week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> Person {
        Person {
            id: id.to_string(),
            name: format!("Person {}", id),
            grade: String::new(),
            college: String::new(),
            major: String::new(),
            schedule_raw: Vec::new(),
        }
    }

    #[test]
    fn load_pool_replaces_people_and_drops_stale_assignments() {
        let mut state = SchedulerState::new();
        state.load_pool(vec![person("s1"), person("s2")]);
        state.assign(1, 2, person("s1"));
        assert_eq!(state.assignments().assigned_count(), 1);

        let count = state.load_pool(vec![person("s3")]);
        assert_eq!(count, 1);
        assert_eq!(state.pool().len(), 1);
        assert!(state.assignments().is_empty());
    }

    #[test]
    fn reset_returns_everything_to_defaults() {
        let mut state = SchedulerState::new();
        state.load_pool(vec![person("s1")]);
        state.assign(1, 2, person("s1"));
        state.unassign(1, 2, "s1");
        state.assign(4, 4, person("s1"));
        state.set_current_week(13);

        state.reset();

        assert!(state.pool().is_empty());
        assert!(state.assignments().is_empty());
        assert_eq!(state.current_week(), DEFAULT_WEEK);
    }

    #[test]
    fn conflict_by_id_for_unknown_person_is_clear() {
        let state = SchedulerState::new();
        assert!(!state.check_conflict_by_id("nobody", 1, 1, 1).conflict);
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = SchedulerState::new();
        state.load_pool(vec![person("s1")]);
        state.assign(2, 3, person("s1"));
        state.set_current_week(5);

        let json = serde_json::to_string(&state).unwrap();
        let back: SchedulerState = serde_json::from_str(&json).unwrap();

        assert_eq!(back.pool().len(), 1);
        assert_eq!(back.assignments().get(2, 3).unwrap()[0].id, "s1");
        assert_eq!(back.current_week(), 5);
    }
}
