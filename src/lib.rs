//! # series-overview
//!
//! Per-series overview bookkeeping for chunked time-series market data
//! stores.
//!
//! Bars and ticks are written to a [`persistence::DataStore`], one table per
//! series. Alongside the data, an [`tracker::OverviewTracker`] keeps a
//! `{start, end, count}` digest for every series in a
//! [`persistence::MetadataStore`], so callers can see what is stored
//! without scanning the data itself.
//!
//! ## Modules
//!
//! - [`types`]: series keys, overview digests and the error type
//! - [`record`]: bar and tick records and their versioned column schemas
//! - [`persistence`]: store traits and in-memory implementations
//! - [`tracker`]: the overview maintenance protocol
//! - [`database`]: a facade that saves, loads and deletes records while
//!   keeping overviews in step
//! - [`config`]: database and tracker settings
//!
//! ## Consistency
//!
//! - an overview exists exactly when its series holds at least one row
//! - `count` is the row total reported by the data store after each write
//! - `start` and `end` only widen while the series exists
//! - data is deleted before its overview, never the other way round
//!
//! ## Example
//!
//! ```rust,ignore
//! use series_overview::prelude::*;
//!
//! let db = SeriesDatabase::in_memory(DatabaseConfig::from_env()?)?;
//! db.save_bar_data(&bars).await?;
//!
//! let overview = db.get_bar_overview().await?;
//! ```

pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Database and tracker configuration.
pub mod config;

/// Record storage facade.
pub mod database;

/// Store traits and in-memory stores.
pub mod persistence;

/// Market data records and schemas.
pub mod record;

/// Overview maintenance.
pub mod tracker;

/// Keys, overviews and errors.
pub mod types;

/// Commonly used items.
pub mod prelude {
    pub use crate::config::{DatabaseConfig, TrackerConfig};
    pub use crate::database::SeriesDatabase;
    pub use crate::persistence::{
        DataStore, InMemoryDataStore, InMemoryMetadataStore, MetadataStore, Row, Value,
    };
    pub use crate::record::{BarData, Record, TickData};
    pub use crate::tracker::OverviewTracker;
    pub use crate::types::{
        Exchange, Interval, OverviewError, OverviewResult, SeriesKey, SeriesOverview, Timestamp,
    };
    pub use crate::{Decimal, dec};
}
