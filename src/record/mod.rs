//! Market data records and their tabular form.
//!
//! A [`Record`] knows its series key, its timestamp and how to convert
//! itself to and from a [`Row`] under its [`Schema`].

/// OHLCV bars.
pub mod bar;

/// Column schemas.
pub mod schema;

/// Level-2 ticks.
pub mod tick;

pub use bar::BarData;
pub use schema::{BAR_SCHEMA, FieldDef, FieldKind, Schema, TICK_SCHEMA, TIME_COLUMN, schema_for};
pub use tick::{TickData, DEPTH};

use crate::persistence::Row;
use crate::types::{OverviewResult, SeriesKey, Timestamp};

/// A market data record that can be stored as a row.
pub trait Record: Sized {
    /// Schema rows of this record type follow.
    fn schema() -> &'static Schema;

    /// Series this record belongs to.
    fn key(&self) -> SeriesKey;

    /// Record timestamp, the row's upsert key.
    fn timestamp(&self) -> Timestamp;

    /// Converts the record into a row under [`Record::schema`].
    fn to_row(&self) -> Row;

    /// Rebuilds a record of series `key` from a stored row.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Schema` if the row does not match the schema
    /// or `key` is of the wrong kind for this record type.
    fn from_row(key: &SeriesKey, row: &Row) -> OverviewResult<Self>;
}
