//! PostgreSQL-backed [`LocationStore`].

use collision_geocode_models::{CollisionLocationRecord, Coordinates, RecordCategory};
use switchy_database::Database;

use crate::{DbError, LocationStore, queries};

/// [`LocationStore`] over a single `switchy_database` connection.
pub struct PostgresLocationStore {
    db: Box<dyn Database>,
}

impl PostgresLocationStore {
    /// Wraps an open connection.
    #[must_use]
    pub fn new(db: Box<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl LocationStore for PostgresLocationStore {
    async fn count_pending(&self, category: RecordCategory) -> Result<u64, DbError> {
        queries::count_pending(self.db.as_ref(), category).await
    }

    async fn fetch_pending(
        &self,
        category: RecordCategory,
        after_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<CollisionLocationRecord>, DbError> {
        queries::fetch_pending(self.db.as_ref(), category, after_id, limit).await
    }

    async fn save_geocode(
        &self,
        category: RecordCategory,
        id: i64,
        coordinates: Option<Coordinates>,
        full_response: &serde_json::Value,
    ) -> Result<(), DbError> {
        queries::save_geocode(self.db.as_ref(), category, id, coordinates, full_response).await
    }
}
