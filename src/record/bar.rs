//! OHLCV bar record.

use crate::Decimal;
use crate::persistence::Row;
use crate::record::Record;
use crate::record::schema::{BAR_SCHEMA, Schema};
use crate::types::{Exchange, Interval, OverviewError, OverviewResult, SeriesKey, Timestamp};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarData {
    /// Instrument symbol.
    pub symbol: String,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Bar interval.
    pub interval: Interval,
    /// Bar open time.
    pub datetime: Timestamp,
    /// Opening price.
    pub open_price: Decimal,
    /// Highest price.
    pub high_price: Decimal,
    /// Lowest price.
    pub low_price: Decimal,
    /// Closing price.
    pub close_price: Decimal,
    /// Traded volume.
    pub volume: Decimal,
    /// Traded value.
    pub turnover: Decimal,
    /// Open interest at bar close.
    pub open_interest: Decimal,
}

impl BarData {
    /// Creates a bar with all prices and volumes set to zero.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        exchange: Exchange,
        interval: Interval,
        datetime: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            interval,
            datetime,
            open_price: Decimal::ZERO,
            high_price: Decimal::ZERO,
            low_price: Decimal::ZERO,
            close_price: Decimal::ZERO,
            volume: Decimal::ZERO,
            turnover: Decimal::ZERO,
            open_interest: Decimal::ZERO,
        }
    }

    /// Sets open, high, low and close prices.
    #[must_use]
    pub fn with_ohlc(mut self, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Self {
        self.open_price = open;
        self.high_price = high;
        self.low_price = low;
        self.close_price = close;
        self
    }

    /// Sets volume and turnover.
    #[must_use]
    pub fn with_volume(mut self, volume: Decimal, turnover: Decimal) -> Self {
        self.volume = volume;
        self.turnover = turnover;
        self
    }

    /// Sets open interest.
    #[must_use]
    pub fn with_open_interest(mut self, open_interest: Decimal) -> Self {
        self.open_interest = open_interest;
        self
    }
}

impl Record for BarData {
    fn schema() -> &'static Schema {
        &BAR_SCHEMA
    }

    fn key(&self) -> SeriesKey {
        SeriesKey::bar(self.symbol.clone(), self.exchange, self.interval)
    }

    fn timestamp(&self) -> Timestamp {
        self.datetime
    }

    fn to_row(&self) -> Row {
        Row::new(self.datetime)
            .with("open_price", self.open_price)
            .with("high_price", self.high_price)
            .with("low_price", self.low_price)
            .with("close_price", self.close_price)
            .with("volume", self.volume)
            .with("turnover", self.turnover)
            .with("open_interest", self.open_interest)
    }

    fn from_row(key: &SeriesKey, row: &Row) -> OverviewResult<Self> {
        let interval = key.interval.ok_or_else(|| {
            OverviewError::Schema(format!("{key} is a tick stream, not a bar series"))
        })?;
        BAR_SCHEMA.validate(row)?;

        Ok(Self {
            symbol: key.symbol.clone(),
            exchange: key.exchange,
            interval,
            datetime: row.timestamp,
            open_price: row.decimal("open_price")?,
            high_price: row.decimal("high_price")?,
            low_price: row.decimal("low_price")?,
            close_price: row.decimal("close_price")?,
            volume: row.decimal("volume")?,
            turnover: row.decimal("turnover")?,
            open_interest: row.decimal("open_interest")?,
        })
    }
}
