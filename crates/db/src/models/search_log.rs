use serde::Serialize;

use meeple_core::filter::GameFilter;

/// One executed search, recorded for usage analytics.
///
/// The filter snapshot is stored as JSON text; `cache_key` links repeated
/// identical searches together without storing the SQL itself.
#[derive(Debug, Clone, Serialize)]
pub struct SearchLogEntry {
    pub cache_key: String,
    pub filters: serde_json::Value,
    pub result_count: i64,
    pub duration_ms: i64,
}

impl SearchLogEntry {
    /// Snapshot an executed search for logging.
    pub fn from_search(
        cache_key: impl Into<String>,
        filter: &GameFilter,
        result_count: i64,
        duration_ms: i64,
    ) -> Self {
        SearchLogEntry {
            cache_key: cache_key.into(),
            filters: serde_json::to_value(filter).unwrap_or(serde_json::Value::Null),
            result_count,
            duration_ms,
        }
    }
}
