//! SwrCache - stale-while-revalidate 用の永続キャッシュ
//!
//! # 方針
//! - `get` は古さに関係なく最後に保存した値を返す（読み出しで消さない）
//! - `is_stale` は副作用のない判定だけ
//! - 書き込み・削除の失敗は握りつぶしてログに残す（呼び出し側には返さない）
//!
//! 保存形式は `<namespace><key>` → `{"data": T, "timestamp": epoch_ms}`。

use chrono::{DateTime, Duration, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::app::config::CacheConfig;
use crate::ports::{Clock, KeyValueStore};

/// One persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Write time, epoch milliseconds.
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

pub struct SwrCache<S, C> {
    store: S,
    clock: C,
    config: CacheConfig,
}

impl<S: KeyValueStore, C: Clock> SwrCache<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, CacheConfig::default())
    }

    pub fn with_config(store: S, clock: C, config: CacheConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.config.namespace, key)
    }

    /// Read and decode the entry. Absent, unreadable and corrupt all mean `None`.
    fn entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.store.get(&self.namespaced(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key, error = %err, "cache read failed");
                return None;
            }
        };
        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) if entry.written_at().is_some() => Some(entry),
            Ok(entry) => {
                tracing::warn!(key, timestamp = entry.timestamp, "cache entry timestamp out of range, treated as miss");
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "corrupt cache entry treated as miss");
                None
            }
        }
    }

    /// Last stored value for `key`, whatever its age.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entry(key).map(|entry| entry.data)
    }

    /// How long ago `key` was written. Never negative.
    pub fn age(&self, key: &str) -> Option<Duration> {
        let entry = self.entry::<IgnoredAny>(key)?;
        let written = entry.written_at()?;
        Some((self.clock.now() - written).max(Duration::zero()))
    }

    /// True when `key` is missing, corrupt, or older than the freshness window.
    pub fn is_stale(&self, key: &str) -> bool {
        match self.entry::<IgnoredAny>(key) {
            Some(entry) => match self.clock.now().timestamp_millis().checked_sub(entry.timestamp) {
                Some(elapsed) => elapsed > self.config.freshness_window.num_milliseconds(),
                None => true,
            },
            None => true,
        }
    }

    /// Store `data` under `key` stamped with the current time.
    ///
    /// Failures (quota, unavailable storage) are logged and dropped.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, data: &T) {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now().timestamp_millis(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, error = %err, "cache set failed to serialize");
                return;
            }
        };
        if let Err(err) = self.store.set(&self.namespaced(key), &raw) {
            tracing::warn!(key, error = %err, "cache set failed");
        }
    }

    pub fn clear(&self, key: &str) {
        if let Err(err) = self.store.remove(&self.namespaced(key)) {
            tracing::warn!(key, error = %err, "cache clear failed");
        }
    }

    /// Remove every key under the namespace. Other keys are untouched.
    pub fn clear_all(&self) {
        if let Err(err) = self.store.remove_prefix(&self.config.namespace) {
            tracing::warn!(namespace = %self.config.namespace, error = %err, "cache clear_all failed");
        }
    }

    /// Logical keys (namespace stripped) currently in the store.
    pub fn keys(&self) -> Vec<String> {
        match self.store.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(&self.config.namespace).map(str::to_string))
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "cache key listing failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryKeyValueStore;
    use crate::ports::FixedClock;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn cache() -> (SwrCache<Arc<InMemoryKeyValueStore>, FixedClock>, Arc<InMemoryKeyValueStore>, FixedClock) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
        (SwrCache::new(store.clone(), clock.clone()), store, clock)
    }

    #[test]
    fn get_returns_value_regardless_of_age() {
        let (cache, _, clock) = cache();
        cache.set("x", &json!({"a": 1}));

        assert_eq!(cache.get::<Value>("x"), Some(json!({"a": 1})));
        assert!(!cache.is_stale("x"));

        clock.advance(Duration::minutes(6));
        assert!(cache.is_stale("x"));
        assert_eq!(cache.get::<Value>("x"), Some(json!({"a": 1})));

        clock.advance(Duration::days(400));
        assert_eq!(cache.get::<Value>("x"), Some(json!({"a": 1})));
    }

    #[rstest]
    #[case::just_written(Duration::zero(), false)]
    #[case::four_minutes(Duration::minutes(4), false)]
    #[case::exactly_five_minutes(Duration::minutes(5), false)]
    #[case::just_past_window(Duration::minutes(5) + Duration::milliseconds(1), true)]
    #[case::six_minutes(Duration::minutes(6), true)]
    fn staleness_threshold(#[case] elapsed: Duration, #[case] stale: bool) {
        let (cache, _, clock) = cache();
        cache.set("users", &vec![1, 2, 3]);

        clock.advance(elapsed);

        assert_eq!(cache.is_stale("users"), stale);
    }

    #[test]
    fn missing_key_is_stale_and_misses() {
        let (cache, _, _) = cache();
        assert!(cache.is_stale("nothing"));
        assert_eq!(cache.get::<Value>("nothing"), None);
        assert_eq!(cache.age("nothing"), None);
    }

    #[test]
    fn entries_are_written_under_the_namespace_as_data_and_timestamp() {
        let (cache, store, clock) = cache();
        cache.set("procurement_items", &vec!["valve"]);

        let raw = store.get("indosense_cache_procurement_items").unwrap().unwrap();
        let entry: CacheEntry<Vec<String>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.data, vec!["valve".to_string()]);
        assert_eq!(entry.timestamp, clock.now().timestamp_millis());
    }

    #[rstest]
    #[case::not_json("{oops")]
    #[case::missing_timestamp(r#"{"data": [1]}"#)]
    #[case::string_timestamp(r#"{"data": [1], "timestamp": "yesterday"}"#)]
    #[case::timestamp_at_i64_min(r#"{"data": [1], "timestamp": -9223372036854775808}"#)]
    #[case::timestamp_at_i64_max(r#"{"data": [1], "timestamp": 9223372036854775807}"#)]
    fn corrupt_entry_is_a_miss_and_stale(#[case] raw: &str) {
        let (cache, store, _) = cache();
        store.set("indosense_cache_bad", raw).unwrap();

        assert_eq!(cache.get::<Vec<i32>>("bad"), None);
        assert!(cache.is_stale("bad"));
        assert_eq!(cache.age("bad"), None);
    }

    #[test]
    fn wrong_shape_is_a_miss() {
        let (cache, _, _) = cache();
        cache.set("n", &42);
        assert_eq!(cache.get::<Vec<String>>("n"), None);
        assert_eq!(cache.get::<i32>("n"), Some(42));
    }

    #[test]
    fn set_overwrites_and_restamps() {
        let (cache, _, clock) = cache();
        cache.set("k", &"old");
        clock.advance(Duration::minutes(10));
        assert!(cache.is_stale("k"));

        cache.set("k", &"new");
        assert_eq!(cache.get::<String>("k").as_deref(), Some("new"));
        assert!(!cache.is_stale("k"));
        assert_eq!(cache.age("k"), Some(Duration::zero()));
    }

    #[test]
    fn quota_failure_is_swallowed_and_previous_value_kept() {
        let store = Arc::new(InMemoryKeyValueStore::with_quota(64));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
        let cache = SwrCache::new(store, clock);

        cache.set("k", &"small");
        cache.set("k", &"x".repeat(500));

        assert_eq!(cache.get::<String>("k").as_deref(), Some("small"));
    }

    #[test]
    fn unavailable_storage_behaves_as_empty_cache() {
        let (cache, store, _) = cache();
        cache.set("k", &1);
        store.set_available(false);

        assert_eq!(cache.get::<i32>("k"), None);
        assert!(cache.is_stale("k"));
        cache.set("k", &2);
        cache.clear("k");
        cache.clear_all();
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn clear_all_recovers_from_a_corrupt_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{truncated").unwrap();
        let store = Arc::new(crate::impls::FileKeyValueStore::new(&path));
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
        let cache = SwrCache::new(store.clone(), clock);
        assert!(store.keys().is_err());

        cache.clear_all();

        assert_eq!(store.keys().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn clear_all_leaves_foreign_keys_alone() {
        let (cache, store, _) = cache();
        cache.set("a", &1);
        cache.set("b", &2);
        store.set("auth_token", "secret").unwrap();

        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        cache.clear("a");
        assert_eq!(cache.get::<i32>("a"), None);
        assert_eq!(cache.get::<i32>("b"), Some(2));

        cache.clear_all();
        assert!(cache.keys().is_empty());
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("secret"));
    }
}
