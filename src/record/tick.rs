//! Level-2 quote tick record.

use crate::Decimal;
use crate::persistence::Row;
use crate::record::Record;
use crate::record::schema::{Schema, TICK_SCHEMA};
use crate::types::{Exchange, OverviewError, OverviewResult, SeriesKey, Timestamp};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of quoted levels per side.
pub const DEPTH: usize = 5;

/// One Level-2 tick with [`DEPTH`] levels of book on each side.
///
/// Level `n` (1-based) of each ladder is stored in the column
/// `{side}_{price|volume}_{n}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickData {
    /// Instrument symbol.
    pub symbol: String,
    /// Listing exchange.
    pub exchange: Exchange,
    /// Exchange timestamp.
    pub datetime: Timestamp,
    /// Instrument display name.
    pub name: String,
    /// Cumulative volume.
    pub volume: Decimal,
    /// Cumulative turnover.
    pub turnover: Decimal,
    /// Open interest.
    pub open_interest: Decimal,
    /// Last traded price.
    pub last_price: Decimal,
    /// Last traded volume.
    pub last_volume: Decimal,
    /// Upper price limit.
    pub limit_up: Decimal,
    /// Lower price limit.
    pub limit_down: Decimal,
    /// Session open price.
    pub open_price: Decimal,
    /// Session high price.
    pub high_price: Decimal,
    /// Session low price.
    pub low_price: Decimal,
    /// Previous close.
    pub pre_close: Decimal,
    /// Bid prices, best first.
    pub bid_price: [Decimal; DEPTH],
    /// Ask prices, best first.
    pub ask_price: [Decimal; DEPTH],
    /// Bid volumes, best first.
    pub bid_volume: [Decimal; DEPTH],
    /// Ask volumes, best first.
    pub ask_volume: [Decimal; DEPTH],
    /// Local receive time, if recorded.
    pub localtime: Option<Timestamp>,
}

impl TickData {
    /// Creates a tick with all prices and volumes set to zero.
    #[must_use]
    pub fn new(symbol: impl Into<String>, exchange: Exchange, datetime: Timestamp) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            datetime,
            name: String::new(),
            volume: Decimal::ZERO,
            turnover: Decimal::ZERO,
            open_interest: Decimal::ZERO,
            last_price: Decimal::ZERO,
            last_volume: Decimal::ZERO,
            limit_up: Decimal::ZERO,
            limit_down: Decimal::ZERO,
            open_price: Decimal::ZERO,
            high_price: Decimal::ZERO,
            low_price: Decimal::ZERO,
            pre_close: Decimal::ZERO,
            bid_price: [Decimal::ZERO; DEPTH],
            ask_price: [Decimal::ZERO; DEPTH],
            bid_volume: [Decimal::ZERO; DEPTH],
            ask_volume: [Decimal::ZERO; DEPTH],
            localtime: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the last trade.
    #[must_use]
    pub fn with_last(mut self, price: Decimal, volume: Decimal) -> Self {
        self.last_price = price;
        self.last_volume = volume;
        self
    }

    /// Sets one book level. `level` is 1-based; out-of-range levels are
    /// ignored.
    #[must_use]
    pub fn with_level(
        mut self,
        level: usize,
        bid: (Decimal, Decimal),
        ask: (Decimal, Decimal),
    ) -> Self {
        if let Some(i) = level.checked_sub(1).filter(|i| *i < DEPTH) {
            self.bid_price[i] = bid.0;
            self.bid_volume[i] = bid.1;
            self.ask_price[i] = ask.0;
            self.ask_volume[i] = ask.1;
        }
        self
    }

    /// Sets the local receive time.
    #[must_use]
    pub fn with_localtime(mut self, localtime: Timestamp) -> Self {
        self.localtime = Some(localtime);
        self
    }
}

fn ladder_column(side: &str, what: &str, index: usize) -> String {
    format!("{side}_{what}_{}", index + 1)
}

fn read_ladder(row: &Row, side: &str, what: &str) -> OverviewResult<[Decimal; DEPTH]> {
    let mut ladder = [Decimal::ZERO; DEPTH];
    for (i, slot) in ladder.iter_mut().enumerate() {
        *slot = row.decimal(&ladder_column(side, what, i))?;
    }
    Ok(ladder)
}

impl Record for TickData {
    fn schema() -> &'static Schema {
        &TICK_SCHEMA
    }

    fn key(&self) -> SeriesKey {
        SeriesKey::tick(self.symbol.clone(), self.exchange)
    }

    fn timestamp(&self) -> Timestamp {
        self.datetime
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new(self.datetime)
            .with("name", self.name.as_str())
            .with("volume", self.volume)
            .with("turnover", self.turnover)
            .with("open_interest", self.open_interest)
            .with("last_price", self.last_price)
            .with("last_volume", self.last_volume)
            .with("limit_up", self.limit_up)
            .with("limit_down", self.limit_down)
            .with("open_price", self.open_price)
            .with("high_price", self.high_price)
            .with("low_price", self.low_price)
            .with("pre_close", self.pre_close)
            .with("localtime", self.localtime);

        for i in 0..DEPTH {
            row = row
                .with(ladder_column("bid", "price", i), self.bid_price[i])
                .with(ladder_column("ask", "price", i), self.ask_price[i])
                .with(ladder_column("bid", "volume", i), self.bid_volume[i])
                .with(ladder_column("ask", "volume", i), self.ask_volume[i]);
        }
        row
    }

    fn from_row(key: &SeriesKey, row: &Row) -> OverviewResult<Self> {
        if key.is_bar() {
            return Err(OverviewError::Schema(format!(
                "{key} is a bar series, not a tick stream"
            )));
        }
        TICK_SCHEMA.validate(row)?;

        Ok(Self {
            symbol: key.symbol.clone(),
            exchange: key.exchange,
            datetime: row.timestamp,
            name: row.text("name")?,
            volume: row.decimal("volume")?,
            turnover: row.decimal("turnover")?,
            open_interest: row.decimal("open_interest")?,
            last_price: row.decimal("last_price")?,
            last_volume: row.decimal("last_volume")?,
            limit_up: row.decimal("limit_up")?,
            limit_down: row.decimal("limit_down")?,
            open_price: row.decimal("open_price")?,
            high_price: row.decimal("high_price")?,
            low_price: row.decimal("low_price")?,
            pre_close: row.decimal("pre_close")?,
            bid_price: read_ladder(row, "bid", "price")?,
            ask_price: read_ladder(row, "ask", "price")?,
            bid_volume: read_ladder(row, "bid", "volume")?,
            ask_volume: read_ladder(row, "ask", "volume")?,
            localtime: row.optional_timestamp("localtime")?,
        })
    }
}
