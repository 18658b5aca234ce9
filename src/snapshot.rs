use std::fs;
use std::path::Path;

use crate::error::ClientError;
use crate::registry::SchedulerState;

/// Writes the whole scheduler state to one JSON file.
pub fn save_state<P: AsRef<Path>>(state: &SchedulerState, path: P) -> Result<(), ClientError> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).map_err(|e| ClientError::Storage(e.to_string()))
}

/// Reads a previously saved state snapshot.
///
/// Returns the loaded state rather than mutating anything, so a failed load
/// leaves the caller's in-memory state exactly as it was.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<SchedulerState, ClientError> {
    let json = fs::read_to_string(path).map_err(|e| ClientError::Storage(e.to_string()))?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Person;

    fn person(id: &str) -> Person {
        Person {
            id: id.to_string(),
            name: id.to_string(),
            grade: String::new(),
            college: String::new(),
            major: String::new(),
            schedule_raw: Vec::new(),
        }
    }

    #[test]
    fn snapshot_survives_a_save_load_cycle() {
        let mut state = SchedulerState::new();
        state.load_pool(vec![person("s1"), person("s2")]);
        state.assign(1, 2, person("s1"));
        state.set_current_week(7);

        let dir = std::env::temp_dir().join("duty-scheduler-snapshot-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");

        save_state(&state, &path).unwrap();
        let loaded = load_state(&path).unwrap();

        assert_eq!(loaded.pool().len(), 2);
        assert_eq!(loaded.assignments().get(1, 2).unwrap()[0].id, "s1");
        assert_eq!(loaded.current_week(), 7);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_snapshot_is_a_storage_error() {
        let err = load_state("/nonexistent/duty-scheduler.json").unwrap_err();
        assert!(matches!(err, crate::error::ClientError::Storage(_)));
        // The operator message must name storage, not the network.
        assert!(err.to_string().starts_with("storage error"));
    }
}
