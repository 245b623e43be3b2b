//! Series identity: exchange and interval codes, and the composite key.

use std::fmt;
use std::str::FromStr;

use crate::types::error::OverviewError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exchange (venue) code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Exchange {
    /// China Financial Futures Exchange.
    Cffex,
    /// Shanghai Futures Exchange.
    Shfe,
    /// Zhengzhou Commodity Exchange.
    Czce,
    /// Dalian Commodity Exchange.
    Dce,
    /// Shanghai International Energy Exchange.
    Ine,
    /// Guangzhou Futures Exchange.
    Gfex,
    /// Shanghai Stock Exchange.
    Sse,
    /// Shenzhen Stock Exchange.
    Szse,
    /// Beijing Stock Exchange.
    Bse,
    /// Smart routing.
    Smart,
    /// New York Stock Exchange.
    Nyse,
    /// NASDAQ.
    Nasdaq,
    /// Chicago Mercantile Exchange.
    Cme,
    /// Binance.
    Binance,
    /// OKX.
    Okx,
    /// Locally generated data.
    Local,
}

impl Exchange {
    /// All known exchanges.
    pub const ALL: [Exchange; 16] = [
        Exchange::Cffex,
        Exchange::Shfe,
        Exchange::Czce,
        Exchange::Dce,
        Exchange::Ine,
        Exchange::Gfex,
        Exchange::Sse,
        Exchange::Szse,
        Exchange::Bse,
        Exchange::Smart,
        Exchange::Nyse,
        Exchange::Nasdaq,
        Exchange::Cme,
        Exchange::Binance,
        Exchange::Okx,
        Exchange::Local,
    ];

    /// Returns the code used in table names and stored documents.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Cffex => "CFFEX",
            Exchange::Shfe => "SHFE",
            Exchange::Czce => "CZCE",
            Exchange::Dce => "DCE",
            Exchange::Ine => "INE",
            Exchange::Gfex => "GFEX",
            Exchange::Sse => "SSE",
            Exchange::Szse => "SZSE",
            Exchange::Bse => "BSE",
            Exchange::Smart => "SMART",
            Exchange::Nyse => "NYSE",
            Exchange::Nasdaq => "NASDAQ",
            Exchange::Cme => "CME",
            Exchange::Binance => "BINANCE",
            Exchange::Okx => "OKX",
            Exchange::Local => "LOCAL",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Exchange {
    type Err = OverviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exchange::ALL
            .iter()
            .copied()
            .find(|e| e.code() == s)
            .ok_or_else(|| OverviewError::InvalidKey(format!("unknown exchange code: {s}")))
    }
}

/// Bar interval code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interval {
    /// One minute bars.
    Minute,
    /// One hour bars.
    Hour,
    /// Daily bars.
    Daily,
    /// Weekly bars.
    Weekly,
    /// Tick-aggregated bars.
    Tick,
}

impl Interval {
    /// All known intervals.
    pub const ALL: [Interval; 5] = [
        Interval::Minute,
        Interval::Hour,
        Interval::Daily,
        Interval::Weekly,
        Interval::Tick,
    ];

    /// Returns the code used in table names and stored documents.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Interval::Minute => "1m",
            Interval::Hour => "1h",
            Interval::Daily => "d",
            Interval::Weekly => "w",
            Interval::Tick => "tick",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = OverviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.code() == s)
            .ok_or_else(|| OverviewError::InvalidKey(format!("unknown interval code: {s}")))
    }
}

/// Identifier of one logical time series.
///
/// Bar series carry an interval; tick streams do not. Two keys are equal
/// only when symbol, exchange and interval all match. The derived ordering
/// sorts by symbol, then exchange, then interval, with tick keys first.
///
/// # Example
///
/// ```rust
/// use series_overview::types::{Exchange, Interval, SeriesKey};
///
/// let key = SeriesKey::bar("rb2410", Exchange::Shfe, Interval::Minute);
/// assert_eq!(key.table_name(), "rb2410_SHFE_1m");
///
/// let tick = SeriesKey::tick("rb2410", Exchange::Shfe);
/// assert_eq!(tick.table_name(), "rb2410_SHFE");
/// assert_ne!(key, tick);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesKey {
    /// Instrument symbol.
    pub symbol: String,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Bar interval, `None` for tick streams.
    pub interval: Option<Interval>,
}

impl SeriesKey {
    /// Creates a key for a bar series.
    #[must_use]
    pub fn bar(symbol: impl Into<String>, exchange: Exchange, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            interval: Some(interval),
        }
    }

    /// Creates a key for a tick stream.
    #[must_use]
    pub fn tick(symbol: impl Into<String>, exchange: Exchange) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            interval: None,
        }
    }

    /// Returns true if this key names a bar series.
    #[must_use]
    pub fn is_bar(&self) -> bool {
        self.interval.is_some()
    }

    /// Returns true if this key names a tick stream.
    #[must_use]
    pub fn is_tick(&self) -> bool {
        self.interval.is_none()
    }

    /// Returns the storage table name for this series.
    #[must_use]
    pub fn table_name(&self) -> String {
        match self.interval {
            Some(interval) => format!("{}_{}_{}", self.symbol, self.exchange, interval),
            None => format!("{}_{}", self.symbol, self.exchange),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table_name())
    }
}
