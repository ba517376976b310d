//! Config - 既定値の集約
//!
//! 画面側の文言・既定値はすべてここの Default 実装に置く。

use chrono::Duration;

/// Settings for the stale-while-revalidate cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Prefix prepended to every logical key in the backing store.
    pub namespace: String,

    /// Entries older than this are reported stale by `is_stale`.
    pub freshness_window: Duration,
}

impl CacheConfig {
    pub const DEFAULT_NAMESPACE: &'static str = "indosense_cache_";

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: Self::DEFAULT_NAMESPACE.to_string(),
            freshness_window: Duration::minutes(5),
        }
    }
}

/// Settings for the Kanban board's drag handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Notice shown when the server rejects a move.
    pub move_failure_message: String,

    /// Position a task takes on the board it is dropped onto.
    pub drop_position: i32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            move_failure_message: "Failed to move task. Please try again.".to_string(),
            drop_position: 0,
        }
    }
}
