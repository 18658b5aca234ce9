use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How long a cached analysis stays usable.
const EXPIRY_HOURS: i64 = 2;

/// Cache for the backend's course-analysis result.
///
/// The analysis JSON is stored opaquely together with when it was fetched;
/// after two hours it is considered stale and callers should re-analyze
/// rather than render old data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisCache {
    result: Option<Value>,
    analyzed_at: Option<DateTime<Utc>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        AnalysisCache::default()
    }

    pub fn store(&mut self, result: Value) {
        self.result = Some(result);
        self.analyzed_at = Some(Utc::now());
    }

    pub fn clear(&mut self) {
        self.result = None;
        self.analyzed_at = None;
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn is_expired(&self) -> bool {
        match self.analyzed_at {
            Some(at) => Utc::now() - at > Duration::hours(EXPIRY_HOURS),
            None => true,
        }
    }

    /// The cached result, unless it has expired.
    pub fn fresh_result(&self) -> Option<&Value> {
        if self.is_expired() {
            None
        } else {
            self.result.as_ref()
        }
    }
}
