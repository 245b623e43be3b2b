//! In-memory store implementations.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::persistence::repository::{DataStore, MetadataStore};
use crate::persistence::types::Row;
use crate::record::schema_for;
use crate::types::{OverviewResult, SeriesKey, SeriesOverview, Timestamp};

// Type aliases for cleaner code
type OverviewMap = HashMap<SeriesKey, SeriesOverview>;
type Table = BTreeMap<Timestamp, Row>;
type TableMap = HashMap<SeriesKey, Table>;

/// In-memory metadata store, used as the default fake in tests.
#[derive(Debug, Clone)]
pub struct InMemoryMetadataStore {
    overviews: Arc<RwLock<OverviewMap>>,
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMetadataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            overviews: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored overviews.
    pub async fn len(&self) -> usize {
        self.overviews.read().await.len()
    }

    /// Returns true if no overview is stored.
    pub async fn is_empty(&self) -> bool {
        self.overviews.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn get(&self, key: &SeriesKey) -> OverviewResult<Option<SeriesOverview>> {
        let overviews: tokio::sync::RwLockReadGuard<'_, OverviewMap> = self.overviews.read().await;
        Ok(overviews.get(key).cloned())
    }

    async fn put(&self, overview: &SeriesOverview) -> OverviewResult<()> {
        overview.validate()?;
        let mut overviews: tokio::sync::RwLockWriteGuard<'_, OverviewMap> =
            self.overviews.write().await;
        overviews.insert(overview.key.clone(), overview.clone());
        Ok(())
    }

    async fn delete(&self, key: &SeriesKey) -> OverviewResult<bool> {
        let mut overviews: tokio::sync::RwLockWriteGuard<'_, OverviewMap> =
            self.overviews.write().await;
        Ok(overviews.remove(key).is_some())
    }

    async fn list(&self) -> OverviewResult<Vec<SeriesOverview>> {
        let overviews: tokio::sync::RwLockReadGuard<'_, OverviewMap> = self.overviews.read().await;
        Ok(overviews.values().cloned().collect())
    }
}

/// In-memory data store keeping each series as a timestamp-ordered table.
#[derive(Debug, Clone)]
pub struct InMemoryDataStore {
    tables: Arc<RwLock<TableMap>>,
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of non-empty tables.
    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn write(&self, key: &SeriesKey, rows: Vec<Row>) -> OverviewResult<u64> {
        let schema = schema_for(key);
        for row in &rows {
            schema.validate(row)?;
        }

        let mut tables: tokio::sync::RwLockWriteGuard<'_, TableMap> = self.tables.write().await;
        if rows.is_empty() {
            return Ok(tables.get(key).map_or(0, |t| t.len() as u64));
        }

        let table = tables.entry(key.clone()).or_default();
        for row in rows {
            table.insert(row.timestamp, row);
        }
        Ok(table.len() as u64)
    }

    async fn delete(&self, key: &SeriesKey) -> OverviewResult<u64> {
        let mut tables: tokio::sync::RwLockWriteGuard<'_, TableMap> = self.tables.write().await;
        Ok(tables.remove(key).map_or(0, |t| t.len() as u64))
    }

    async fn read(
        &self,
        key: &SeriesKey,
        start: Timestamp,
        end: Timestamp,
    ) -> OverviewResult<Vec<Row>> {
        if start > end {
            return Ok(Vec::new());
        }
        let tables: tokio::sync::RwLockReadGuard<'_, TableMap> = self.tables.read().await;
        let result: Vec<Row> = tables
            .get(key)
            .map(|table| table.range(start..=end).map(|(_, row)| row.clone()).collect())
            .unwrap_or_default();
        Ok(result)
    }

    async fn row_count(&self, key: &SeriesKey) -> OverviewResult<u64> {
        let tables: tokio::sync::RwLockReadGuard<'_, TableMap> = self.tables.read().await;
        Ok(tables.get(key).map_or(0, |t| t.len() as u64))
    }
}
