//! Versioned column schemas for stored records.
//!
//! Every stored column is declared once here. Marshalling code in
//! [`crate::record::bar`] and [`crate::record::tick`] reads and writes rows
//! through these declarations, and data stores validate incoming rows
//! against them, so adding a column means bumping the schema version and
//! extending the field list.

use crate::persistence::Row;
use crate::types::error::{OverviewError, OverviewResult};

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Required UTC timestamp.
    Timestamp,
    /// Decimal number.
    Decimal,
    /// Free text.
    Text,
    /// UTC timestamp that may be null.
    OptionalTimestamp,
}

/// A named, typed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Column name.
    pub name: &'static str,
    /// Column type.
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, kind }
}

/// Name of the time column every schema starts with. Its value lives in
/// [`Row::timestamp`] rather than in the value map.
pub const TIME_COLUMN: &str = "date";

/// A versioned list of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Schema name, also the library suffix (`bar_data`, `tick_data`).
    pub name: &'static str,
    /// Incremented on every column change.
    pub version: u32,
    /// Columns in storage order, time column first.
    pub fields: &'static [FieldDef],
}

impl Schema {
    /// Looks a column up by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the value columns, that is everything but the time column.
    pub fn value_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.name != TIME_COLUMN)
    }

    /// Checks that `row` carries exactly this schema's value columns with
    /// matching types.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Schema` naming the first offending column.
    pub fn validate(&self, row: &Row) -> OverviewResult<()> {
        for def in self.value_fields() {
            match row.get(def.name) {
                None => {
                    return Err(OverviewError::Schema(format!(
                        "{} v{}: missing column {}",
                        self.name, self.version, def.name
                    )));
                }
                Some(value) if !value.fits(def.kind) => {
                    return Err(OverviewError::Schema(format!(
                        "{} v{}: column {} expects {:?}, found {:?}",
                        self.name, self.version, def.name, def.kind, value
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(extra) = row
            .values
            .keys()
            .find(|name| self.field(name).is_none_or(|def| def.name == TIME_COLUMN))
        {
            return Err(OverviewError::Schema(format!(
                "{} v{}: unknown column {}",
                self.name, self.version, extra
            )));
        }

        Ok(())
    }
}

/// Columns of OHLCV bar tables.
pub const BAR_SCHEMA: Schema = Schema {
    name: "bar_data",
    version: 1,
    fields: &[
        field(TIME_COLUMN, FieldKind::Timestamp),
        field("open_price", FieldKind::Decimal),
        field("high_price", FieldKind::Decimal),
        field("low_price", FieldKind::Decimal),
        field("close_price", FieldKind::Decimal),
        field("volume", FieldKind::Decimal),
        field("turnover", FieldKind::Decimal),
        field("open_interest", FieldKind::Decimal),
    ],
};

/// Columns of Level-2 tick tables.
pub const TICK_SCHEMA: Schema = Schema {
    name: "tick_data",
    version: 1,
    fields: &[
        field(TIME_COLUMN, FieldKind::Timestamp),
        field("name", FieldKind::Text),
        field("volume", FieldKind::Decimal),
        field("turnover", FieldKind::Decimal),
        field("open_interest", FieldKind::Decimal),
        field("last_price", FieldKind::Decimal),
        field("last_volume", FieldKind::Decimal),
        field("limit_up", FieldKind::Decimal),
        field("limit_down", FieldKind::Decimal),
        field("open_price", FieldKind::Decimal),
        field("high_price", FieldKind::Decimal),
        field("low_price", FieldKind::Decimal),
        field("pre_close", FieldKind::Decimal),
        field("bid_price_1", FieldKind::Decimal),
        field("bid_price_2", FieldKind::Decimal),
        field("bid_price_3", FieldKind::Decimal),
        field("bid_price_4", FieldKind::Decimal),
        field("bid_price_5", FieldKind::Decimal),
        field("ask_price_1", FieldKind::Decimal),
        field("ask_price_2", FieldKind::Decimal),
        field("ask_price_3", FieldKind::Decimal),
        field("ask_price_4", FieldKind::Decimal),
        field("ask_price_5", FieldKind::Decimal),
        field("bid_volume_1", FieldKind::Decimal),
        field("bid_volume_2", FieldKind::Decimal),
        field("bid_volume_3", FieldKind::Decimal),
        field("bid_volume_4", FieldKind::Decimal),
        field("bid_volume_5", FieldKind::Decimal),
        field("ask_volume_1", FieldKind::Decimal),
        field("ask_volume_2", FieldKind::Decimal),
        field("ask_volume_3", FieldKind::Decimal),
        field("ask_volume_4", FieldKind::Decimal),
        field("ask_volume_5", FieldKind::Decimal),
        field("localtime", FieldKind::OptionalTimestamp),
    ],
};

/// Returns the schema rows for `key` must follow.
#[must_use]
pub fn schema_for(key: &crate::types::SeriesKey) -> &'static Schema {
    if key.is_bar() { &BAR_SCHEMA } else { &TICK_SCHEMA }
}
