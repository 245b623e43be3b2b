//! Store traits the tracker and the database facade are written against.

use async_trait::async_trait;

use crate::persistence::types::Row;
use crate::types::{OverviewResult, SeriesKey, SeriesOverview, Timestamp};

/// Durable key-value store holding one overview per series.
///
/// Implementations must make [`MetadataStore::put`] a single atomic
/// replace: after a failed `put` the previous value, if any, is still
/// readable. Failures are reported as `OverviewError::StoreUnavailable`.
///
/// [`crate::tracker::OverviewTracker`] is the intended only writer.
/// Implementations still reject digests failing
/// [`SeriesOverview::validate`] in `put`, so a caller going around the
/// tracker cannot store one.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Gets the overview stored for `key`.
    async fn get(&self, key: &SeriesKey) -> OverviewResult<Option<SeriesOverview>>;

    /// Stores `overview` under its key, replacing any previous value.
    ///
    /// Fails with `OverviewError::InvalidOverview`, storing nothing, if the
    /// digest breaks `start <= end` or `count > 0`.
    async fn put(&self, overview: &SeriesOverview) -> OverviewResult<()>;

    /// Removes the overview for `key`. Returns true if one existed.
    async fn delete(&self, key: &SeriesKey) -> OverviewResult<bool>;

    /// Returns every stored overview in unspecified order.
    async fn list(&self) -> OverviewResult<Vec<SeriesOverview>>;
}

/// Time-series row store, one table per series.
///
/// Rows are upserted by timestamp, so the row count reported after a write
/// may grow by less than the number of rows written.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Upserts `rows` into the table of `key` and returns the table's row
    /// count after the write.
    async fn write(&self, key: &SeriesKey, rows: Vec<Row>) -> OverviewResult<u64>;

    /// Drops the table of `key` and returns how many rows it held.
    async fn delete(&self, key: &SeriesKey) -> OverviewResult<u64>;

    /// Reads rows with `start <= timestamp <= end`, oldest first.
    async fn read(
        &self,
        key: &SeriesKey,
        start: Timestamp,
        end: Timestamp,
    ) -> OverviewResult<Vec<Row>>;

    /// Returns the number of rows stored for `key`.
    async fn row_count(&self, key: &SeriesKey) -> OverviewResult<u64>;
}
