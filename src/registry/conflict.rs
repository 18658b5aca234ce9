use super::types::{ConflictCheck, Person};

/// Checks whether a person is busy at (day, period) during the given week.
///
/// Scans every schedule entry matching the slot, not just the first one:
/// alternating-week courses produce multiple entries at the same (day, period)
/// with disjoint busy-week sets, and any one of them can claim the week.
/// Never mutates the person and never fails; a missing person or an empty
/// schedule simply reports no conflict.
pub fn check_conflict(person: Option<&Person>, day: u8, period: u8, week: u32) -> ConflictCheck {
    let Some(person) = person else {
        return ConflictCheck::clear();
    };

    for entry in person
        .schedule_raw
        .iter()
        .filter(|e| e.day == day && e.period == period)
    {
        if entry.busy_weeks.contains(&week) {
            let reason = if entry.course_name.is_empty() {
                "scheduled class".to_string()
            } else {
                entry.course_name.clone()
            };
            return ConflictCheck::busy(reason);
        }
    }

    ConflictCheck::clear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::types::ScheduleEntry;

    fn entry(day: u8, period: u8, course: &str, weeks: &[u32]) -> ScheduleEntry {
        ScheduleEntry {
            day,
            period,
            course_name: course.to_string(),
            location: None,
            busy_weeks: weeks.to_vec(),
        }
    }

    fn person(entries: Vec<ScheduleEntry>) -> Person {
        Person {
            id: "s1".to_string(),
            name: "Alice".to_string(),
            grade: String::new(),
            college: String::new(),
            major: String::new(),
            schedule_raw: entries,
        }
    }

    #[test]
    fn inspects_every_entry_sharing_the_slot() {
        // Odd/even week alternation: two courses at the same (day, period).
        let p = person(vec![
            entry(1, 2, "Linear Algebra", &[1, 3, 5]),
            entry(1, 2, "Physics Lab", &[2, 4, 6]),
        ]);

        let odd = check_conflict(Some(&p), 1, 2, 1);
        assert!(odd.conflict);
        assert_eq!(odd.reason.as_deref(), Some("Linear Algebra"));

        let even = check_conflict(Some(&p), 1, 2, 2);
        assert!(even.conflict);
        assert_eq!(even.reason.as_deref(), Some("Physics Lab"));

        let free = check_conflict(Some(&p), 1, 2, 7);
        assert!(!free.conflict);
        assert!(free.reason.is_none());
    }

    #[test]
    fn other_slots_do_not_trigger() {
        let p = person(vec![entry(1, 2, "Linear Algebra", &[1, 2, 3])]);
        assert!(!check_conflict(Some(&p), 1, 3, 1).conflict);
        assert!(!check_conflict(Some(&p), 2, 2, 1).conflict);
    }

    #[test]
    fn empty_schedule_and_missing_person_are_never_conflicts() {
        let p = person(vec![]);
        assert!(!check_conflict(Some(&p), 1, 1, 1).conflict);
        assert!(!check_conflict(None, 1, 1, 1).conflict);
    }

    #[test]
    fn empty_course_name_gets_a_placeholder_reason() {
        let p = person(vec![entry(4, 5, "", &[9])]);
        let res = check_conflict(Some(&p), 4, 5, 9);
        assert!(res.conflict);
        assert_eq!(res.reason.as_deref(), Some("scheduled class"));
    }
}
