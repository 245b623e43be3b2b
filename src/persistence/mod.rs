//! Persistence layer: store traits and in-memory implementations.
//!
//! This module provides the two collaborators the tracker and the database
//! facade are written against:
//! - [`MetadataStore`]: one overview document per series
//! - [`DataStore`]: timestamp-keyed tables of [`Row`]s, one per series
//!
//! Both come with in-memory implementations backed by `tokio` locks, which
//! double as test fakes.
//!
//! # Example
//!
//! ```rust,ignore
//! use series_overview::persistence::{InMemoryMetadataStore, MetadataStore};
//!
//! let store = InMemoryMetadataStore::new();
//! store.put(&overview).await?;
//! let stored = store.get(&overview.key).await?;
//! ```

mod memory;
mod repository;
mod types;

pub use memory::{InMemoryDataStore, InMemoryMetadataStore};
pub use repository::{DataStore, MetadataStore};
pub use types::{Row, Value};
