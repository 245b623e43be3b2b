//! The per-series summary digest.

use chrono::{DateTime, Duration, Utc};

use crate::types::error::{OverviewError, OverviewResult};
use crate::types::key::SeriesKey;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timestamp type used for every stored record.
pub type Timestamp = DateTime<Utc>;

/// Summary of one stored series: earliest and latest timestamps and the
/// number of rows currently stored.
///
/// A stored overview always has `start <= end` and `count > 0`. When a series
/// is emptied its overview is deleted rather than zeroed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesOverview {
    /// Series this digest describes.
    pub key: SeriesKey,
    /// Earliest record timestamp stored.
    pub start: Timestamp,
    /// Latest record timestamp stored.
    pub end: Timestamp,
    /// Number of rows stored, as reported by the data store.
    pub count: u64,
}

impl SeriesOverview {
    /// Creates a validated overview.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::InvalidOverview` if `start > end` or
    /// `count == 0`.
    pub fn new(key: SeriesKey, start: Timestamp, end: Timestamp, count: u64) -> OverviewResult<Self> {
        let overview = Self {
            key,
            start,
            end,
            count,
        };
        overview.validate()?;
        Ok(overview)
    }

    /// Checks `start <= end` and `count > 0`.
    ///
    /// The fields are public, so stores re-check digests built outside
    /// [`SeriesOverview::new`] before persisting them.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::InvalidOverview` naming the broken rule.
    pub fn validate(&self) -> OverviewResult<()> {
        if self.start > self.end {
            return Err(OverviewError::InvalidOverview(format!(
                "{}: start {} is after end {}",
                self.key, self.start, self.end
            )));
        }
        if self.count == 0 {
            return Err(OverviewError::InvalidOverview(format!(
                "{}: an overview must cover at least one row",
                self.key
            )));
        }
        Ok(())
    }

    /// Widens the covered range to include `[batch_min, batch_max]` and takes
    /// `count` as the new row total.
    ///
    /// The range only ever grows, so applying the same set of batches in any
    /// order gives the same `start` and `end`.
    #[must_use]
    pub fn merged(&self, batch_min: Timestamp, batch_max: Timestamp, count: u64) -> Self {
        Self {
            key: self.key.clone(),
            start: self.start.min(batch_min),
            end: self.end.max(batch_max),
            count,
        }
    }

    /// Returns true if `ts` falls inside the covered range.
    #[must_use]
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Returns the length of the covered range.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Serializes the overview into its stored JSON document.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Schema` if serialization fails.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> OverviewResult<String> {
        serde_json::to_string(self).map_err(|e| OverviewError::Schema(e.to_string()))
    }

    /// Parses an overview from its stored JSON document and re-checks its
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Schema` for malformed documents and
    /// `OverviewError::InvalidOverview` for documents that break the
    /// `start <= end`, `count > 0` rule.
    #[cfg(feature = "serde")]
    pub fn from_json(document: &str) -> OverviewResult<Self> {
        let overview: Self =
            serde_json::from_str(document).map_err(|e| OverviewError::Schema(e.to_string()))?;
        overview.validate()?;
        Ok(overview)
    }
}
