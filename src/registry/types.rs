use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// One course block parsed out of a person's weekly schedule.
///
/// A person can have several entries at the same (day, period) when courses
/// alternate by week, so conflict checks must look at every matching entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Day of week (1 = Monday .. 7 = Sunday)
    #[serde(deserialize_with = "de_flex_u8")]
    pub day: u8,
    /// Period within the day (1-10)
    #[serde(deserialize_with = "de_flex_u8", alias = "section")]
    pub period: u8,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Calendar week numbers during which this entry occupies the person
    #[serde(default, deserialize_with = "de_flex_u32_vec")]
    pub busy_weeks: Vec<u32>,
}

/// A person in the scheduling pool, as returned by the remote parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub schedule_raw: Vec<ScheduleEntry>,
}

/// One assignable (day, period) cell in the weekly grid.
///
/// Serializes as the string `"day_period"` so assignment maps snapshot as
/// plain JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub day: u8,
    pub period: u8,
}

impl SlotKey {
    pub fn new(day: u8, period: u8) -> Self {
        SlotKey { day, period }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.day, self.period)
    }
}

impl Serialize for SlotKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let (day, period) = raw
            .split_once('_')
            .ok_or_else(|| de::Error::custom(format!("invalid slot key: {}", raw)))?;
        Ok(SlotKey {
            day: day
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid slot day: {}", raw)))?,
            period: period
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid slot period: {}", raw)))?,
        })
    }
}

/// Result of checking one person against one (day, period, week) cell.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictCheck {
    pub conflict: bool,
    pub reason: Option<String>,
}

impl ConflictCheck {
    pub fn clear() -> Self {
        ConflictCheck {
            conflict: false,
            reason: None,
        }
    }

    pub fn busy(reason: String) -> Self {
        ConflictCheck {
            conflict: true,
            reason: Some(reason),
        }
    }
}

/// Accepts a JSON number or a numeric string; UI controls send either.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexNum {
    Num(i64),
    Str(String),
}

impl FlexNum {
    fn as_i64<E: de::Error>(&self) -> Result<i64, E> {
        match self {
            FlexNum::Num(n) => Ok(*n),
            FlexNum::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("not a number: {}", s))),
        }
    }
}

pub(crate) fn de_flex_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let n = FlexNum::deserialize(deserializer)?.as_i64()?;
    u8::try_from(n).map_err(|_| de::Error::custom(format!("out of range: {}", n)))
}

pub(crate) fn de_flex_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = FlexNum::deserialize(deserializer)?.as_i64()?;
    u32::try_from(n).map_err(|_| de::Error::custom(format!("out of range: {}", n)))
}

fn de_flex_u32_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u32>, D::Error> {
    let raw = Vec::<FlexNum>::deserialize(deserializer)?;
    raw.iter()
        .map(|v| {
            let n = v.as_i64()?;
            u32::try_from(n).map_err(|_| de::Error::custom(format!("out of range: {}", n)))
        })
        .collect()
}
