use std::fs::File;
use std::io::Write;

use crate::registry::{check_conflict, Person, SchedulerState};

pub const DAYS: u8 = 7;
pub const PERIODS: u8 = 10;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Formats a person with their grade tag, e.g. "[2023] Alice".
pub fn format_person_label(person: &Person) -> String {
    if person.grade.is_empty() {
        person.name.clone()
    } else {
        format!("[{}] {}", person.grade, person.name)
    }
}

pub fn day_name(day: u8) -> &'static str {
    match day {
        1..=7 => DAY_NAMES[day as usize - 1],
        _ => "Day?",
    }
}

/// Prints a one-line-per-person overview of the loaded pool.
pub fn print_pool_summary(pool: &[Person]) {
    println!("\n=== Pool ({} people) ===", pool.len());
    for person in pool {
        println!(
            "  {} (id: {}, {} schedule entries)",
            format_person_label(person),
            person.id,
            person.schedule_raw.len()
        );
    }
}

/// Prints, for one week, who is free in each (day, period) cell.
pub fn print_week_grid(state: &SchedulerState, week: u32) {
    println!("\n=== Week {} availability ===", week);
    for day in 1..=DAYS {
        println!("{}:", day_name(day));
        for period in 1..=PERIODS {
            let free: Vec<String> = state
                .pool()
                .iter()
                .filter(|p| !check_conflict(Some(*p), day, period, week).conflict)
                .map(format_person_label)
                .collect();

            let assigned = state
                .assignments()
                .get(day, period)
                .map(|list| list.iter().map(format_person_label).collect::<Vec<_>>())
                .unwrap_or_default();

            if assigned.is_empty() {
                println!("  Period {:2} -> free: {}", period, free.join(", "));
            } else {
                println!(
                    "  Period {:2} -> assigned: {} | free: {}",
                    period,
                    assigned.join(", "),
                    free.join(", ")
                );
            }
        }
    }
}

/// Writes the week's assignment grid to a file, one slot per line.
pub fn write_week_grid_to_file(
    state: &SchedulerState,
    week: u32,
    filename: &str,
) -> Result<(), std::io::Error> {
    let mut file = File::create(filename)?;

    writeln!(file, "** Week {} **", week)?;
    for day in 1..=DAYS {
        for period in 1..=PERIODS {
            let assigned = state
                .assignments()
                .get(day, period)
                .map(|list| list.iter().map(format_person_label).collect::<Vec<_>>())
                .unwrap_or_default();
            if assigned.is_empty() {
                writeln!(file, "{} period {} [EMPTY]", day_name(day), period)?;
            } else {
                writeln!(
                    file,
                    "{} period {} {}",
                    day_name(day),
                    period,
                    assigned.join(", ")
                )?;
            }
        }
    }

    Ok(())
}
