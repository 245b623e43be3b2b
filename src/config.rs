//! Database and tracker configuration.

use crate::types::error::{OverviewError, OverviewResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable holding the database name.
pub const ENV_DATABASE_NAME: &str = "SERIES_DATABASE_NAME";

/// Environment variable enabling per-key serialization (`true`/`false`,
/// `1`/`0`).
pub const ENV_SERIALIZE_PER_KEY: &str = "SERIES_SERIALIZE_PER_KEY";

/// Tracker behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackerConfig {
    /// Hold a per-key mutex across each read-merge-write.
    ///
    /// Enable this when the metadata store cannot guarantee atomic
    /// read-modify-write on a single key and several writers may update the
    /// same series concurrently. [`crate::database::SeriesDatabase`] locks
    /// around both of its store steps itself and builds its tracker
    /// without this.
    pub serialize_per_key: bool,
}

/// Configuration of a [`crate::database::SeriesDatabase`].
///
/// # Example
///
/// ```rust
/// use series_overview::config::DatabaseConfig;
///
/// let config = DatabaseConfig::new("research").with_serialize_per_key(false);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.bar_library(), "research.bar_data");
/// assert_eq!(config.overview_library(), "research.data_overview");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatabaseConfig {
    /// Database name, the prefix of every library name.
    pub database: String,
    /// Serialize saves and deletes of the same series, holding one per-key
    /// mutex across the data-store step and the overview step.
    ///
    /// Only disable this when the caller already guarantees a single
    /// writer per series, for example one ingestion worker per key.
    pub serialize_per_key: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database: "vnpy".to_string(),
            serialize_per_key: true,
        }
    }
}

impl DatabaseConfig {
    /// Creates a configuration for `database` with default settings.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Sets per-key serialization.
    #[must_use]
    pub fn with_serialize_per_key(mut self, enabled: bool) -> Self {
        self.serialize_per_key = enabled;
        self
    }

    /// Builds a configuration from the environment, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::InvalidConfiguration` if a variable holds an
    /// unparseable value or the resulting configuration fails
    /// [`DatabaseConfig::validate`].
    pub fn from_env() -> OverviewResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OverviewResult<Self> {
        let mut config = Self::default();

        if let Some(database) = lookup(ENV_DATABASE_NAME) {
            config.database = database;
        }

        if let Some(flag) = lookup(ENV_SERIALIZE_PER_KEY) {
            config.serialize_per_key = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(OverviewError::InvalidConfiguration(format!(
                        "{ENV_SERIALIZE_PER_KEY} must be a boolean, got {other:?}"
                    )));
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the database name.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::InvalidConfiguration` if the name is empty or
    /// contains whitespace or `.`, which would break library names.
    pub fn validate(&self) -> OverviewResult<()> {
        if self.database.is_empty() {
            return Err(OverviewError::InvalidConfiguration(
                "database name must not be empty".to_string(),
            ));
        }
        if self
            .database
            .chars()
            .any(|c| c.is_whitespace() || c == '.')
        {
            return Err(OverviewError::InvalidConfiguration(format!(
                "database name {:?} must not contain whitespace or '.'",
                self.database
            )));
        }
        Ok(())
    }

    /// Library holding bar tables.
    ///
    /// The library names are naming conventions for external chunked
    /// backends; the in-memory stores keep a single namespace per store
    /// and do not use them.
    #[must_use]
    pub fn bar_library(&self) -> String {
        format!("{}.bar_data", self.database)
    }

    /// Library holding tick tables.
    #[must_use]
    pub fn tick_library(&self) -> String {
        format!("{}.tick_data", self.database)
    }

    /// Library holding overview documents.
    #[must_use]
    pub fn overview_library(&self) -> String {
        format!("{}.data_overview", self.database)
    }
}
