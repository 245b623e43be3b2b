//! Tabular row types exchanged with data stores.

use std::collections::BTreeMap;

use crate::Decimal;
use crate::record::schema::FieldKind;
use crate::types::error::{OverviewError, OverviewResult};
use crate::types::overview::Timestamp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Decimal number (prices, volumes).
    Decimal(Decimal),
    /// Free text.
    Text(String),
    /// UTC timestamp.
    Timestamp(Timestamp),
    /// Missing value.
    Null,
}

impl Value {
    /// Returns true if this value may be stored in a column of `kind`.
    #[must_use]
    pub fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Value::Decimal(_), FieldKind::Decimal)
                | (Value::Text(_), FieldKind::Text)
                | (Value::Timestamp(_), FieldKind::Timestamp)
                | (Value::Timestamp(_), FieldKind::OptionalTimestamp)
                | (Value::Null, FieldKind::OptionalTimestamp)
        )
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Option<Timestamp>> for Value {
    fn from(value: Option<Timestamp>) -> Self {
        value.map_or(Value::Null, Value::Timestamp)
    }
}

/// One stored row: the `date` natural key plus named column values.
///
/// Data stores upsert rows by `timestamp`, so writing a row whose timestamp
/// already exists replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Row {
    /// Row timestamp, the upsert key.
    pub timestamp: Timestamp,
    /// Column values by name.
    pub values: BTreeMap<String, Value>,
}

impl Row {
    /// Creates an empty row at `timestamp`.
    #[must_use]
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Sets a column value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns a column value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a decimal column.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Schema` if the column is missing or not a
    /// decimal.
    pub fn decimal(&self, name: &str) -> OverviewResult<Decimal> {
        match self.get(name) {
            Some(Value::Decimal(d)) => Ok(*d),
            other => Err(mismatch(name, "decimal", other)),
        }
    }

    /// Returns a text column.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Schema` if the column is missing or not text.
    pub fn text(&self, name: &str) -> OverviewResult<String> {
        match self.get(name) {
            Some(Value::Text(s)) => Ok(s.clone()),
            other => Err(mismatch(name, "text", other)),
        }
    }

    /// Returns an optional timestamp column.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Schema` if the column is missing or holds
    /// neither a timestamp nor null.
    pub fn optional_timestamp(&self, name: &str) -> OverviewResult<Option<Timestamp>> {
        match self.get(name) {
            Some(Value::Timestamp(ts)) => Ok(Some(*ts)),
            Some(Value::Null) => Ok(None),
            other => Err(mismatch(name, "timestamp or null", other)),
        }
    }
}

fn mismatch(name: &str, expected: &str, found: Option<&Value>) -> OverviewError {
    match found {
        None => OverviewError::Schema(format!("missing column {name}")),
        Some(value) => {
            OverviewError::Schema(format!("column {name}: expected {expected}, found {value:?}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::new(ts(1))
            .with("close_price", dec!(3650.5))
            .with("name", "rebar")
            .with("localtime", None::<Timestamp>);

        assert_eq!(row.decimal("close_price").unwrap(), dec!(3650.5));
        assert_eq!(row.text("name").unwrap(), "rebar");
        assert_eq!(row.optional_timestamp("localtime").unwrap(), None);
    }

    #[test]
    fn test_row_accessor_errors() {
        let row = Row::new(ts(1)).with("name", "rebar");

        assert!(matches!(row.decimal("volume"), Err(OverviewError::Schema(_))));
        assert!(matches!(row.decimal("name"), Err(OverviewError::Schema(_))));
        assert!(row.optional_timestamp("name").is_err());
    }

    #[test]
    fn test_value_fits() {
        assert!(Value::Decimal(dec!(1)).fits(FieldKind::Decimal));
        assert!(Value::Null.fits(FieldKind::OptionalTimestamp));
        assert!(Value::Timestamp(ts(0)).fits(FieldKind::OptionalTimestamp));
        assert!(!Value::Null.fits(FieldKind::Decimal));
        assert!(!Value::Text("x".to_string()).fits(FieldKind::Decimal));
    }
}
