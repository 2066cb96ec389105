#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database access for collision location geocoding.
//!
//! Uses `switchy_database` with raw parameterized SQL against the
//! `intersection_geocodings` and `street_address_geocodings` tables. The
//! schema itself is owned by the ingestion side and is not migrated here.
//!
//! The geocoding runner talks to storage only through [`LocationStore`],
//! implemented for PostgreSQL by [`store::PostgresLocationStore`].

pub mod db;
pub mod queries;
pub mod store;

use collision_geocode_models::{CollisionLocationRecord, Coordinates, RecordCategory};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// An update matched no row.
    #[error("No row with id {id} in {table}")]
    RecordNotFound {
        /// Table that was updated.
        table: &'static str,
        /// Identifier that matched nothing.
        id: i64,
    },
}

/// Storage of collision location records awaiting geocoding.
#[async_trait::async_trait]
pub trait LocationStore: Send + Sync {
    /// Counts records of `category` eligible for geocoding.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    async fn count_pending(&self, category: RecordCategory) -> Result<u64, DbError>;

    /// Fetches up to `limit` eligible records of `category` with an id
    /// greater than `after_id`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a row cannot be decoded.
    async fn fetch_pending(
        &self,
        category: RecordCategory,
        after_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<CollisionLocationRecord>, DbError>;

    /// Stores a geocoder response on a record, marking it processed.
    /// Coordinates are only written when `coordinates` is `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the update fails or matches no row.
    async fn save_geocode(
        &self,
        category: RecordCategory,
        id: i64,
        coordinates: Option<Coordinates>,
        full_response: &serde_json::Value,
    ) -> Result<(), DbError>;
}
