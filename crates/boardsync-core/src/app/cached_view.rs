//! CachedView - 一覧画面の stale-while-revalidate 手順
//!
//! 1. マウント時にキャッシュを読み、あれば即表示（loading = false）
//! 2. キャッシュの鮮度に関係なく、必ず API から取り直す
//! 3. 成功したらキャッシュを更新して表示を差し替える
//! 4. 失敗したら表示中のデータはそのまま残し、ログだけ出す

use std::fmt::Display;
use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::swr_cache::SwrCache;
use crate::ports::{Clock, KeyValueStore};

#[derive(Debug, Clone, PartialEq)]
pub struct CachedView<T> {
    key: String,
    data: Option<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> CachedView<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data: None,
            loading: true,
            error: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set only when a fetch failed and nothing was on screen.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show the cached snapshot, then always revalidate with `fetch`.
    pub async fn mount<S, C, F, Fut, E>(&mut self, cache: &SwrCache<S, C>, fetch: F)
    where
        S: KeyValueStore,
        C: Clock,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if let Some(cached) = cache.get::<T>(&self.key) {
            self.data = Some(cached);
            self.loading = false;
        }
        self.refresh(cache, fetch).await;
    }

    /// Fetch fresh data and store it. Used on mount and after mutations.
    pub async fn refresh<S, C, F, Fut, E>(&mut self, cache: &SwrCache<S, C>, fetch: F)
    where
        S: KeyValueStore,
        C: Clock,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let show_loading = self.data.is_none();
        if show_loading {
            self.loading = true;
        }

        match fetch().await {
            Ok(fresh) => {
                cache.set(&self.key, &fresh);
                self.data = Some(fresh);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "background fetch failed");
                if self.data.is_none() {
                    self.error = Some(err.to_string());
                }
            }
        }

        self.loading = false;
    }

    /// Switch to another key (e.g. a filter changed) and forget shown data.
    pub fn rekey(&mut self, key: impl Into<String>) {
        self.key = key.into();
        self.data = None;
        self.loading = true;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryKeyValueStore;
    use crate::ports::FixedClock;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    type Cache = SwrCache<Arc<InMemoryKeyValueStore>, FixedClock>;

    fn cache() -> (Cache, FixedClock) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());
        (
            SwrCache::new(Arc::new(InMemoryKeyValueStore::new()), clock.clone()),
            clock,
        )
    }

    #[tokio::test]
    async fn cold_mount_fetches_and_stores() {
        let (cache, _) = cache();
        let mut view = CachedView::<Vec<String>>::new("procurement_items");
        assert!(view.is_loading());

        view.mount(&cache, || async { Ok::<_, String>(vec!["valve".to_string()]) })
            .await;

        assert_eq!(view.data(), Some(&vec!["valve".to_string()]));
        assert!(!view.is_loading());
        assert_eq!(cache.get::<Vec<String>>("procurement_items"), Some(vec!["valve".to_string()]));
    }

    #[tokio::test]
    async fn fresh_cache_is_still_revalidated() {
        let (cache, _) = cache();
        cache.set("items", &vec![1]);
        assert!(!cache.is_stale("items"));
        let mut view = CachedView::<Vec<i32>>::new("items");
        let mut fetched = false;

        view.mount(&cache, || {
            fetched = true;
            async { Ok::<_, String>(vec![1, 2]) }
        })
        .await;

        assert!(fetched);
        assert_eq!(view.data(), Some(&vec![1, 2]));
        assert_eq!(cache.get::<Vec<i32>>("items"), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn failed_revalidation_keeps_stale_data_without_error() {
        let (cache, clock) = cache();
        cache.set("items", &vec![7]);
        clock.advance(Duration::hours(3));
        let mut view = CachedView::<Vec<i32>>::new("items");

        view.mount(&cache, || async { Err::<Vec<i32>, _>("502 bad gateway") })
            .await;

        assert_eq!(view.data(), Some(&vec![7]));
        assert!(view.error().is_none());
        assert!(!view.is_loading());
        assert!(cache.is_stale("items"));
    }

    #[tokio::test]
    async fn failed_cold_mount_reports_error() {
        let (cache, _) = cache();
        let mut view = CachedView::<Vec<i32>>::new("items");

        view.mount(&cache, || async { Err::<Vec<i32>, _>("offline") })
            .await;

        assert!(view.data().is_none());
        assert_eq!(view.error(), Some("offline"));
        assert!(!view.is_loading());
        assert_eq!(cache.get::<Vec<i32>>("items"), None);
    }

    #[tokio::test]
    async fn rekey_reads_the_new_filter_snapshot() {
        let (cache, _) = cache();
        cache.set("timesheets_list_my_a", &vec![1]);
        cache.set("timesheets_list_all_a", &vec![1, 2, 3]);
        let mut view = CachedView::<Vec<i32>>::new("timesheets_list_my_a");
        view.mount(&cache, || async { Err::<Vec<i32>, _>("offline") })
            .await;
        assert_eq!(view.data(), Some(&vec![1]));

        view.rekey("timesheets_list_all_a");
        view.mount(&cache, || async { Err::<Vec<i32>, _>("offline") })
            .await;

        assert_eq!(view.data(), Some(&vec![1, 2, 3]));
    }
}
