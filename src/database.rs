//! Database facade pairing a data store with the overview tracker.
//!
//! [`SeriesDatabase`] is what ingestion code talks to. It marshals records
//! into rows, writes them, and keeps overviews in step:
//!
//! - saves write the data first and then record the overview with the row
//!   count the data store reports
//! - deletes drop the data first and then the overview, so an interrupted
//!   delete leaves at worst a stale overview, never data without one
//! - with `serialize_per_key` (the default) one per-key mutex is held
//!   across both steps, so same-series saves and deletes apply to the
//!   overview in the order they applied to the data
//!
//! # Example
//!
//! ```rust,ignore
//! use series_overview::config::DatabaseConfig;
//! use series_overview::database::SeriesDatabase;
//!
//! let db = SeriesDatabase::in_memory(DatabaseConfig::default())?;
//! db.save_bar_data(&bars).await?;
//!
//! for overview in db.get_bar_overview().await? {
//!     println!("{} {} .. {} ({} bars)", overview.key, overview.start, overview.end, overview.count);
//! }
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::persistence::{DataStore, InMemoryDataStore, InMemoryMetadataStore, MetadataStore, Row};
use crate::record::{BarData, Record, TickData};
use crate::config::TrackerConfig;
use crate::tracker::OverviewTracker;
use crate::tracker::locks::{KeyGuard, KeyLocks};
use crate::types::{
    Exchange, Interval, OverviewError, OverviewResult, SeriesKey, SeriesOverview, Timestamp,
};

/// Bar and tick storage with per-series overviews.
pub struct SeriesDatabase<D: DataStore, M: MetadataStore> {
    config: DatabaseConfig,
    data: Arc<D>,
    tracker: OverviewTracker<M>,
    locks: Option<KeyLocks>,
}

impl SeriesDatabase<InMemoryDataStore, InMemoryMetadataStore> {
    /// Creates a database backed by in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::InvalidConfiguration` if `config` is invalid.
    pub fn in_memory(config: DatabaseConfig) -> OverviewResult<Self> {
        Self::new(
            config,
            Arc::new(InMemoryDataStore::new()),
            Arc::new(InMemoryMetadataStore::new()),
        )
    }
}

impl<D: DataStore, M: MetadataStore> SeriesDatabase<D, M> {
    /// Creates a database over the given stores.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::InvalidConfiguration` if `config` is invalid.
    pub fn new(config: DatabaseConfig, data: Arc<D>, metadata: Arc<M>) -> OverviewResult<Self> {
        config.validate()?;
        info!(
            "opening database {} (bars: {}, ticks: {}, overviews: {})",
            config.database,
            config.bar_library(),
            config.tick_library(),
            config.overview_library()
        );
        // the facade's own lock spans both store steps, so the tracker needs none
        let tracker = OverviewTracker::with_config(metadata, TrackerConfig::default());
        let locks = config.serialize_per_key.then(KeyLocks::new);
        Ok(Self {
            config,
            data,
            tracker,
            locks,
        })
    }

    /// Returns true if same-series saves and deletes are serialized.
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

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Returns the overview tracker.
    #[must_use]
    pub fn tracker(&self) -> &OverviewTracker<M> {
        &self.tracker
    }

    /// Returns the data store.
    #[must_use]
    pub fn data_store(&self) -> &Arc<D> {
        &self.data
    }

    /// Saves bars of a single series and updates its overview.
    ///
    /// Returns `None` for an empty slice, in which case nothing is written.
    ///
    /// # Errors
    ///
    /// - `OverviewError::InvalidBatch` if the bars belong to more than one
    ///   series
    /// - `OverviewError::Schema` or `OverviewError::StoreUnavailable` from
    ///   the stores
    pub async fn save_bar_data(&self, bars: &[BarData]) -> OverviewResult<Option<SeriesOverview>> {
        self.save(bars).await
    }

    /// Saves ticks of a single stream and updates its overview.
    ///
    /// Same rules as [`SeriesDatabase::save_bar_data`].
    ///
    /// # Errors
    ///
    /// See [`SeriesDatabase::save_bar_data`].
    pub async fn save_tick_data(
        &self,
        ticks: &[TickData],
    ) -> OverviewResult<Option<SeriesOverview>> {
        self.save(ticks).await
    }

    async fn save<R: Record + Sync>(&self, records: &[R]) -> OverviewResult<Option<SeriesOverview>> {
        let Some(first) = records.first() else {
            debug!("skipping empty {} batch", R::schema().name);
            return Ok(None);
        };

        let key = first.key();
        if let Some(stray) = records.iter().map(Record::key).find(|k| *k != key) {
            return Err(OverviewError::InvalidBatch(format!(
                "batch mixes series {key} and {stray}"
            )));
        }

        let rows: Vec<Row> = records.iter().map(Record::to_row).collect();
        let stamps: Vec<Timestamp> = records.iter().map(Record::timestamp).collect();

        let _guard = self.lock(&key).await;
        let count = self.data.write(&key, rows).await?;
        let overview = self.tracker.record_write(&key, &stamps, count).await?;

        info!(
            "saved {} rows to {}, {} stored",
            records.len(),
            key,
            overview.count
        );
        Ok(Some(overview))
    }

    /// Loads bars of one series with `start <= datetime <= end`, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// `OverviewError::Schema` for rows that cannot be rebuilt, or
    /// `OverviewError::StoreUnavailable`.
    pub async fn load_bar_data(
        &self,
        symbol: &str,
        exchange: Exchange,
        interval: Interval,
        start: Timestamp,
        end: Timestamp,
    ) -> OverviewResult<Vec<BarData>> {
        self.load(&SeriesKey::bar(symbol, exchange, interval), start, end)
            .await
    }

    /// Loads ticks of one stream with `start <= datetime <= end`, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// See [`SeriesDatabase::load_bar_data`].
    pub async fn load_tick_data(
        &self,
        symbol: &str,
        exchange: Exchange,
        start: Timestamp,
        end: Timestamp,
    ) -> OverviewResult<Vec<TickData>> {
        self.load(&SeriesKey::tick(symbol, exchange), start, end)
            .await
    }

    async fn load<R: Record>(
        &self,
        key: &SeriesKey,
        start: Timestamp,
        end: Timestamp,
    ) -> OverviewResult<Vec<R>> {
        let rows = self.data.read(key, start, end).await?;
        debug!("loaded {} rows from {}", rows.len(), key);
        rows.iter().map(|row| R::from_row(key, row)).collect()
    }

    /// Deletes all bars of one series and its overview. Returns the number
    /// of rows removed.
    ///
    /// # Errors
    ///
    /// `OverviewError::StoreUnavailable` from either store.
    pub async fn delete_bar_data(
        &self,
        symbol: &str,
        exchange: Exchange,
        interval: Interval,
    ) -> OverviewResult<u64> {
        self.delete(&SeriesKey::bar(symbol, exchange, interval))
            .await
    }

    /// Deletes all ticks of one stream and its overview. Returns the number
    /// of rows removed.
    ///
    /// # Errors
    ///
    /// `OverviewError::StoreUnavailable` from either store.
    pub async fn delete_tick_data(&self, symbol: &str, exchange: Exchange) -> OverviewResult<u64> {
        self.delete(&SeriesKey::tick(symbol, exchange)).await
    }

    async fn delete(&self, key: &SeriesKey) -> OverviewResult<u64> {
        let _guard = self.lock(key).await;
        let removed = self.data.delete(key).await?;
        self.tracker.record_delete(key).await?;
        info!("deleted {} rows from {}", removed, key);
        Ok(removed)
    }

    /// Returns overviews of all bar series, sorted by key.
    ///
    /// # Errors
    ///
    /// `OverviewError::StoreUnavailable` from the metadata store.
    pub async fn get_bar_overview(&self) -> OverviewResult<Vec<SeriesOverview>> {
        self.overviews(SeriesKey::is_bar).await
    }

    /// Returns overviews of all tick streams, sorted by key.
    ///
    /// # Errors
    ///
    /// `OverviewError::StoreUnavailable` from the metadata store.
    pub async fn get_tick_overview(&self) -> OverviewResult<Vec<SeriesOverview>> {
        self.overviews(SeriesKey::is_tick).await
    }

    async fn overviews(&self, keep: fn(&SeriesKey) -> bool) -> OverviewResult<Vec<SeriesOverview>> {
        let mut overviews: Vec<SeriesOverview> = self
            .tracker
            .list_overviews()
            .await?
            .filter(|o| keep(&o.key))
            .collect();
        overviews.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(overviews)
    }
}
