use serde::Deserialize;
use serde_json::Value;

use crate::registry::Person;

/// The backend's uniform result wrapper: `{ code, msg, data }`.
/// `code == 200` is success; anything else carries an operator-facing `msg`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

pub const SUCCESS_CODE: i32 = 200;

/// Normalized shape of a parser response.
///
/// The parse endpoint has been observed returning a bare list, an envelope
/// with a `data` list, and a doubly-wrapped `data.data` list. All the shape
/// sniffing lives in [`normalize_pool_response`]; callers only ever see one
/// of these three outcomes. `Empty` is a distinct, non-error outcome: the
/// upload worked but produced no usable records.
#[derive(Debug)]
pub enum PoolPayload {
    Records(Vec<Person>),
    Empty,
    Malformed,
}

/// Flattens the three accepted response shapes into a person list.
///
/// Any shape other than the three known ones is `Malformed`, never a panic;
/// a recognized shape with zero records is `Empty`.
pub fn normalize_pool_response(value: &Value) -> PoolPayload {
    let list = if value.is_array() {
        Some(value)
    } else if value.get("data").map_or(false, Value::is_array) {
        value.get("data")
    } else if value
        .pointer("/data/data")
        .map_or(false, Value::is_array)
    {
        value.pointer("/data/data")
    } else {
        None
    };

    let Some(list) = list else {
        return PoolPayload::Malformed;
    };

    match serde_json::from_value::<Vec<Person>>(list.clone()) {
        Ok(people) if people.is_empty() => PoolPayload::Empty,
        Ok(people) => PoolPayload::Records(people),
        Err(_) => PoolPayload::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_person() -> Value {
        json!({
            "id": "stu-1",
            "name": "Alice",
            "scheduleRaw": [
                {"day": 1, "section": 2, "courseName": "Calculus", "busyWeeks": [1, 2]}
            ]
        })
    }

    #[test]
    fn accepts_bare_list() {
        let value = json!([sample_person()]);
        match normalize_pool_response(&value) {
            PoolPayload::Records(people) => {
                assert_eq!(people.len(), 1);
                assert_eq!(people[0].schedule_raw[0].period, 2);
            }
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[test]
    fn accepts_data_list() {
        let value = json!({"data": [sample_person()]});
        assert!(matches!(
            normalize_pool_response(&value),
            PoolPayload::Records(_)
        ));
    }

    #[test]
    fn accepts_nested_data_data_list() {
        let value = json!({"data": {"data": [sample_person()]}});
        assert!(matches!(
            normalize_pool_response(&value),
            PoolPayload::Records(_)
        ));
    }

    #[test]
    fn empty_list_is_distinct_from_malformed() {
        assert!(matches!(
            normalize_pool_response(&json!({"data": []})),
            PoolPayload::Empty
        ));
        assert!(matches!(
            normalize_pool_response(&json!({"data": "nope"})),
            PoolPayload::Malformed
        ));
        assert!(matches!(
            normalize_pool_response(&json!(42)),
            PoolPayload::Malformed
        ));
    }

    #[test]
    fn records_failing_to_parse_are_malformed() {
        // A list of things that are not people.
        let value = json!([{"day": "not-a-person"}]);
        assert!(matches!(
            normalize_pool_response(&value),
            PoolPayload::Malformed
        ));
    }
}
