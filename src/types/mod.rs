//! Core types: errors, series keys and overview digests.

/// Error types.
pub mod error;

/// Series identity.
pub mod key;

/// Overview digests.
pub mod overview;

pub use error::{OverviewError, OverviewResult};
pub use key::{Exchange, Interval, SeriesKey};
pub use overview::{SeriesOverview, Timestamp};
