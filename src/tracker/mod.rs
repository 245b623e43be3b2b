//! Series overview tracker.
//!
//! The tracker keeps one [`SeriesOverview`] per series consistent with the
//! data store as batches are written and series are deleted. It is written
//! entirely against the [`MetadataStore`] trait, which is injected at
//! construction.
//!
//! # Overview
//!
//! For each key the overview is either absent or present:
//!
//! - `record_write` on an absent key creates `{start, end, count}` from the
//!   batch and the store-reported row count
//! - `record_write` on a present key widens `start`/`end` and replaces
//!   `count`
//! - `record_delete` removes it; on an absent key it returns `false`
//!
//! The count handed to `record_write` is the data store's own row total
//! after the write, not a running sum, because upserts may replace rows
//! instead of adding them.
//!
//! Nothing is ever written except real overviews, so listings need no
//! filtering.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use series_overview::persistence::InMemoryMetadataStore;
//! use series_overview::tracker::OverviewTracker;
//! use series_overview::types::{Exchange, Interval, SeriesKey};
//!
//! let tracker = OverviewTracker::new(Arc::new(InMemoryMetadataStore::new()));
//! let key = SeriesKey::bar("rb2410", Exchange::Shfe, Interval::Minute);
//!
//! tracker.record_write(&key, &[t100, t105, t103], 3).await?;
//! let overview = tracker.record_write(&key, &[t90, t110], 5).await?;
//! assert_eq!((overview.start, overview.end, overview.count), (t90, t110, 5));
//!
//! assert!(tracker.record_delete(&key).await?);
//! assert!(tracker.get_overview(&key).await?.is_none());
//! ```

pub(crate) mod locks;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::persistence::MetadataStore;
use crate::types::{OverviewError, OverviewResult, SeriesKey, SeriesOverview, Timestamp};

use locks::{KeyGuard, KeyLocks};

/// Maintains per-series overviews in a [`MetadataStore`].
///
/// The tracker performs no retries. A failed call leaves the stored
/// overview as it was, and a retry must repeat the whole call.
pub struct OverviewTracker<M: MetadataStore> {
    store: Arc<M>,
    locks: Option<KeyLocks>,
}

impl<M: MetadataStore> OverviewTracker<M> {
    /// Creates a tracker over `store` that relies on the store for
    /// same-key atomicity.
    #[must_use]
    pub fn new(store: Arc<M>) -> Self {
        Self::with_config(store, TrackerConfig::default())
    }

    /// Creates a tracker with explicit settings.
    #[must_use]
    pub fn with_config(store: Arc<M>, config: TrackerConfig) -> Self {
        Self {
            store,
            locks: config.serialize_per_key.then(KeyLocks::new),
        }
    }

    /// Returns the underlying metadata store.
    #[must_use]
    pub fn store(&self) -> &Arc<M> {
        &self.store
    }

    /// Returns true if same-key calls are serialized by the tracker.
    #[must_use]
    pub fn serializes_per_key(&self) -> bool {
        self.locks.is_some()
    }

    async fn lock(&self, key: &SeriesKey) -> Option<KeyGuard<'_>> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(key).await),
            None => None,
        }
    }

    /// Records that `batch` was written to the series `key`, leaving
    /// `row_count_after_write` rows in the data store.
    ///
    /// The batch need not be sorted. Returns the overview as persisted.
    ///
    /// # Errors
    ///
    /// - `OverviewError::InvalidBatch` if `batch` is empty or
    ///   `row_count_after_write` is zero; nothing is stored
    /// - `OverviewError::StoreUnavailable` from the metadata store; the
    ///   previous overview is left untouched
    pub async fn record_write(
        &self,
        key: &SeriesKey,
        batch: &[Timestamp],
        row_count_after_write: u64,
    ) -> OverviewResult<SeriesOverview> {
        let Some((batch_min, batch_max)) = bounds(batch) else {
            warn!("rejected empty batch for {}", key);
            return Err(OverviewError::InvalidBatch(format!(
                "{key}: batch must contain at least one timestamp"
            )));
        };
        if row_count_after_write == 0 {
            warn!("rejected batch for {} with zero reported rows", key);
            return Err(OverviewError::InvalidBatch(format!(
                "{key}: reported row count is zero after a non-empty write"
            )));
        }

        let _guard = self.lock(key).await;

        let overview = match self.store.get(key).await? {
            Some(existing) => {
                let merged = existing.merged(batch_min, batch_max, row_count_after_write);
                debug!(
                    "merged overview {}: [{}, {}] -> [{}, {}], count {} -> {}",
                    key,
                    existing.start,
                    existing.end,
                    merged.start,
                    merged.end,
                    existing.count,
                    merged.count
                );
                merged
            }
            None => {
                let created =
                    SeriesOverview::new(key.clone(), batch_min, batch_max, row_count_after_write)?;
                debug!(
                    "created overview {}: [{}, {}], count {}",
                    key, created.start, created.end, created.count
                );
                created
            }
        };

        self.store.put(&overview).await.inspect_err(|e| {
            warn!("failed to persist overview {}: {}", key, e);
        })?;
        Ok(overview)
    }

    /// Removes the overview of `key`. Returns true if one existed.
    ///
    /// Call this only after the series data itself has been deleted, so
    /// that a crash in between leaves a stale overview rather than data
    /// without one.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::StoreUnavailable` from the metadata store.
    pub async fn record_delete(&self, key: &SeriesKey) -> OverviewResult<bool> {
        let _guard = self.lock(key).await;
        let removed = self.store.delete(key).await?;
        if removed {
            debug!("removed overview {}", key);
        } else {
            debug!("no overview to remove for {}", key);
        }
        Ok(removed)
    }

    /// Returns the overview of `key`, or `None` if the series has none.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::StoreUnavailable` from the metadata store.
    pub async fn get_overview(&self, key: &SeriesKey) -> OverviewResult<Option<SeriesOverview>> {
        self.store.get(key).await
    }

    /// Returns every stored overview in unspecified order.
    ///
    /// The iterator walks a snapshot taken at call time; call again for a
    /// fresh pass.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::StoreUnavailable` from the metadata store.
    pub async fn list_overviews(&self) -> OverviewResult<impl Iterator<Item = SeriesOverview>> {
        Ok(self.store.list().await?.into_iter())
    }

    /// Returns every stored overview sorted by key.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::StoreUnavailable` from the metadata store.
    pub async fn list_overviews_sorted(&self) -> OverviewResult<Vec<SeriesOverview>> {
        let mut overviews: Vec<SeriesOverview> = self.list_overviews().await?.collect();
        overviews.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(overviews)
    }
}

fn bounds(batch: &[Timestamp]) -> Option<(Timestamp, Timestamp)> {
    let (first, rest) = batch.split_first()?;
    Some(
        rest.iter()
            .fold((*first, *first), |(lo, hi), ts| (lo.min(*ts), hi.max(*ts))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryMetadataStore;
    use crate::types::{Exchange, Interval};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn key(symbol: &str) -> SeriesKey {
        SeriesKey::bar(symbol, Exchange::Shfe, Interval::Minute)
    }

    fn tracker() -> OverviewTracker<InMemoryMetadataStore> {
        OverviewTracker::new(Arc::new(InMemoryMetadataStore::new()))
    }

    /// Metadata store whose reads or writes can be switched off.
    #[derive(Default)]
    struct FailingMetadataStore {
        inner: InMemoryMetadataStore,
        fail_get: AtomicBool,
        fail_put: AtomicBool,
    }

    impl FailingMetadataStore {
        fn unavailable() -> OverviewError {
            OverviewError::StoreUnavailable("metadata store offline".to_string())
        }
    }

    #[async_trait]
    impl MetadataStore for FailingMetadataStore {
        async fn get(&self, key: &SeriesKey) -> OverviewResult<Option<SeriesOverview>> {
            if self.fail_get.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            self.inner.get(key).await
        }

        async fn put(&self, overview: &SeriesOverview) -> OverviewResult<()> {
            if self.fail_put.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            self.inner.put(overview).await
        }

        async fn delete(&self, key: &SeriesKey) -> OverviewResult<bool> {
            self.inner.delete(key).await
        }

        async fn list(&self) -> OverviewResult<Vec<SeriesOverview>> {
            self.inner.list().await
        }
    }

    #[test]
    fn test_bounds() {
        assert_eq!(bounds(&[]), None);
        assert_eq!(bounds(&[ts(5)]), Some((ts(5), ts(5))));
        assert_eq!(bounds(&[ts(100), ts(105), ts(103)]), Some((ts(100), ts(105))));
    }

    #[tokio::test]
    async fn test_first_write_creates_overview() {
        let tracker = tracker();
        let overview = tracker
            .record_write(&key("K"), &[ts(100), ts(105), ts(103)], 3)
            .await
            .unwrap();

        assert_eq!(overview.start, ts(100));
        assert_eq!(overview.end, ts(105));
        assert_eq!(overview.count, 3);
        assert_eq!(tracker.get_overview(&key("K")).await.unwrap(), Some(overview));
    }

    #[tokio::test]
    async fn test_subsequent_write_merges() {
        let tracker = tracker();
        tracker
            .record_write(&key("K"), &[ts(100), ts(105), ts(103)], 3)
            .await
            .unwrap();
        let overview = tracker
            .record_write(&key("K"), &[ts(90), ts(110)], 5)
            .await
            .unwrap();

        assert_eq!(overview.start, ts(90));
        assert_eq!(overview.end, ts(110));
        assert_eq!(overview.count, 5);
    }

    #[tokio::test]
    async fn test_count_follows_store_not_batch_size() {
        let tracker = tracker();
        tracker
            .record_write(&key("K"), &[ts(1), ts(2), ts(3)], 3)
            .await
            .unwrap();
        // rewriting existing rows does not grow the table
        let overview = tracker
            .record_write(&key("K"), &[ts(2), ts(3)], 3)
            .await
            .unwrap();
        assert_eq!(overview.count, 3);
    }

    #[tokio::test]
    async fn test_write_order_does_not_change_range() {
        let batches = [
            vec![ts(50), ts(60)],
            vec![ts(10), ts(20)],
            vec![ts(30), ts(100)],
        ];

        let forward = tracker();
        for batch in &batches {
            forward.record_write(&key("K"), batch, 6).await.unwrap();
        }
        let backward = tracker();
        for batch in batches.iter().rev() {
            backward.record_write(&key("K"), batch, 6).await.unwrap();
        }

        assert_eq!(
            forward.get_overview(&key("K")).await.unwrap(),
            backward.get_overview(&key("K")).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_empty_batch_rejected_without_side_effects() {
        let tracker = tracker();
        let result = tracker.record_write(&key("K"), &[], 3).await;
        assert!(matches!(result, Err(OverviewError::InvalidBatch(_))));
        assert!(tracker.get_overview(&key("K")).await.unwrap().is_none());

        tracker
            .record_write(&key("K"), &[ts(100)], 1)
            .await
            .unwrap();
        let result = tracker.record_write(&key("K"), &[], 9).await;
        assert!(matches!(result, Err(OverviewError::InvalidBatch(_))));
        assert_eq!(tracker.get_overview(&key("K")).await.unwrap().unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_zero_row_count_rejected() {
        let tracker = tracker();
        let result = tracker.record_write(&key("K"), &[ts(100)], 0).await;
        assert!(matches!(result, Err(OverviewError::InvalidBatch(_))));
        assert_eq!(tracker.list_overviews().await.unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_absent() {
        let tracker = tracker();
        tracker
            .record_write(&key("K"), &[ts(100)], 1)
            .await
            .unwrap();

        assert!(tracker.record_delete(&key("K")).await.unwrap());
        assert!(tracker.get_overview(&key("K")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let tracker = tracker();
        tracker
            .record_write(&key("A"), &[ts(100)], 1)
            .await
            .unwrap();

        assert!(!tracker.record_delete(&key("B")).await.unwrap());
        assert_eq!(tracker.list_overviews().await.unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_recreate_after_delete_starts_fresh() {
        let tracker = tracker();
        tracker
            .record_write(&key("K"), &[ts(10), ts(500)], 2)
            .await
            .unwrap();
        tracker.record_delete(&key("K")).await.unwrap();

        let overview = tracker
            .record_write(&key("K"), &[ts(200)], 1)
            .await
            .unwrap();
        assert_eq!(overview.start, ts(200));
        assert_eq!(overview.end, ts(200));
    }

    #[tokio::test]
    async fn test_list_after_delete() {
        let tracker = tracker();
        for symbol in ["A", "B", "C"] {
            tracker
                .record_write(&key(symbol), &[ts(100)], 1)
                .await
                .unwrap();
        }
        tracker.record_delete(&key("B")).await.unwrap();

        let symbols: Vec<String> = tracker
            .list_overviews_sorted()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.key.symbol)
            .collect();
        assert_eq!(symbols, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_list_is_restartable() {
        let tracker = tracker();
        tracker
            .record_write(&key("A"), &[ts(100)], 1)
            .await
            .unwrap();

        assert_eq!(tracker.list_overviews().await.unwrap().count(), 1);
        assert_eq!(tracker.list_overviews().await.unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let tracker = tracker();
        assert!(tracker.list_overviews().await.unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_failed_put_keeps_previous_overview() {
        let store = Arc::new(FailingMetadataStore::default());
        let tracker = OverviewTracker::new(Arc::clone(&store));
        let before = tracker
            .record_write(&key("K"), &[ts(100), ts(105)], 2)
            .await
            .unwrap();

        store.fail_put.store(true, Ordering::SeqCst);
        let result = tracker.record_write(&key("K"), &[ts(90), ts(110)], 4).await;
        assert!(matches!(result, Err(OverviewError::StoreUnavailable(_))));
        assert!(result.unwrap_err().is_retryable());

        store.fail_put.store(false, Ordering::SeqCst);
        assert_eq!(tracker.get_overview(&key("K")).await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn test_failed_get_propagates() {
        let store = Arc::new(FailingMetadataStore::default());
        let tracker = OverviewTracker::new(Arc::clone(&store));
        store.fail_get.store(true, Ordering::SeqCst);

        let result = tracker.record_write(&key("K"), &[ts(100)], 1).await;
        assert!(matches!(result, Err(OverviewError::StoreUnavailable(_))));

        store.fail_get.store(false, Ordering::SeqCst);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serialized_concurrent_writes_keep_widest_range() {
        let store = Arc::new(InMemoryMetadataStore::new());
        let tracker = Arc::new(OverviewTracker::with_config(
            Arc::clone(&store),
            TrackerConfig {
                serialize_per_key: true,
            },
        ));
        assert!(tracker.serializes_per_key());

        let mut handles = Vec::new();
        for i in 0..32i64 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                tracker
                    .record_write(&key("K"), &[ts(1_000 + i), ts(2_000 - i)], 10)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let overview = tracker.get_overview(&key("K")).await.unwrap().unwrap();
        assert_eq!(overview.start, ts(1_000));
        assert_eq!(overview.end, ts(2_000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_keys_written_in_parallel() {
        let tracker = Arc::new(tracker());

        let mut handles = Vec::new();
        for i in 0..16i64 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                let key = key(&format!("S{i}"));
                tracker.record_write(&key, &[ts(i), ts(i + 10)], 2).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(tracker.list_overviews().await.unwrap().count(), 16);
    }
}
