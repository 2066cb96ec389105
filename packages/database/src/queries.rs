//! Selection and update queries for collision location records.
//!
//! Eligibility is expressed entirely in SQL so pending counts and batches
//! agree. The street-address filters are generated from the pattern
//! constants in [`collision_geocode_models`] and must stay in step with
//! `collision_geocode_geocoder::address::is_geocodable_street_address`.

use std::fmt::Write as _;

use collision_geocode_models::{
    CollisionLocation, CollisionLocationRecord, Coordinates, EAST_DRIVE_PATTERN,
    HOUSE_NUMBER_PATTERN, NON_GEOCODABLE_PATTERNS, RecordCategory,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Builds the `WHERE` condition selecting records of `category` that still
/// need geocoding. Placeholders are numbered from `$first_param`.
///
/// Returns the condition and its bound parameters.
#[must_use]
pub fn pending_condition(
    category: RecordCategory,
    first_param: usize,
) -> (String, Vec<DatabaseValue>) {
    let mut sql = String::from("full_response IS NULL");
    let mut params = Vec::new();

    if category == RecordCategory::StreetAddress {
        let mut idx = first_param;

        for pattern in NON_GEOCODABLE_PATTERNS {
            let _ = write!(sql, " AND off_street_name NOT ILIKE ${idx}::text");
            params.push(DatabaseValue::String(format!("%{pattern}%")));
            idx += 1;
        }

        // A blank borough counts as absent, as in
        // `collision_geocode_geocoder::address::is_geocodable_street_address`.
        let _ = write!(
            sql,
            " AND NOT (off_street_name ~* ${idx}::text AND COALESCE(TRIM(reported_borough), '') = '')"
        );
        params.push(DatabaseValue::String(EAST_DRIVE_PATTERN.to_string()));
        idx += 1;

        let _ = write!(sql, " AND off_street_name ~ ${idx}::text");
        params.push(DatabaseValue::String(HOUSE_NUMBER_PATTERN.to_string()));
    }

    (sql, params)
}

/// Columns selected for each category, with `id` widened to `bigint`.
const fn select_columns(category: RecordCategory) -> &'static str {
    match category {
        RecordCategory::Intersection => {
            "id::bigint AS id, on_street_name, cross_street_name, reported_borough,
             latitude::float8 AS latitude, longitude::float8 AS longitude"
        }
        RecordCategory::StreetAddress => {
            "id::bigint AS id, off_street_name, reported_borough,
             latitude::float8 AS latitude, longitude::float8 AS longitude"
        }
    }
}

/// Counts records of `category` that still need geocoding.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn count_pending(db: &dyn Database, category: RecordCategory) -> Result<u64, DbError> {
    let (condition, params) = pending_condition(category, 1);
    let sql = format!(
        "SELECT COUNT(*)::bigint AS count FROM {} WHERE {condition}",
        category.table_name()
    );

    let rows = db.query_raw_params(&sql, &params).await?;
    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: format!("COUNT returned no row for {}", category.table_name()),
    })?;

    let count: i64 = row.to_value("count").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse pending count: {e}"),
    })?;

    u64::try_from(count).map_err(|e| DbError::Conversion {
        message: format!("Negative pending count {count}: {e}"),
    })
}

/// Fetches up to `limit` pending records of `category` with `id >
/// after_id`, ordered by id.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn fetch_pending(
    db: &dyn Database,
    category: RecordCategory,
    after_id: Option<i64>,
    limit: u32,
) -> Result<Vec<CollisionLocationRecord>, DbError> {
    let (condition, mut params) = pending_condition(category, 1);
    let after_idx = params.len() + 1;
    let limit_idx = params.len() + 2;

    let sql = format!(
        "SELECT {} FROM {} WHERE {condition} AND id > ${after_idx}::bigint ORDER BY id LIMIT ${limit_idx}::bigint",
        select_columns(category),
        category.table_name(),
    );
    params.push(DatabaseValue::Int64(after_id.unwrap_or(i64::MIN)));
    params.push(DatabaseValue::Int64(i64::from(limit)));

    let rows = db.query_raw_params(&sql, &params).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse {} id: {e}", category.table_name()),
        })?;

        let location = match category {
            RecordCategory::Intersection => CollisionLocation::Intersection {
                on_street_name: row.to_value("on_street_name").unwrap_or(None),
                cross_street_name: row.to_value("cross_street_name").unwrap_or(None),
            },
            RecordCategory::StreetAddress => CollisionLocation::StreetAddress {
                off_street_name: row.to_value("off_street_name").unwrap_or(None),
            },
        };

        records.push(CollisionLocationRecord {
            id,
            location,
            reported_borough: row.to_value("reported_borough").unwrap_or(None),
            latitude: row.to_value("latitude").unwrap_or(None),
            longitude: row.to_value("longitude").unwrap_or(None),
            full_response: None,
        });
    }

    Ok(records)
}

/// Stores the raw geocoder response on a record, writing coordinates only
/// when a result was accepted.
///
/// # Errors
///
/// Returns [`DbError::RecordNotFound`] if no row has `id`, or
/// [`DbError::Database`] if the update fails.
pub async fn save_geocode(
    db: &dyn Database,
    category: RecordCategory,
    id: i64,
    coordinates: Option<Coordinates>,
    full_response: &serde_json::Value,
) -> Result<(), DbError> {
    let table = category.table_name();
    let response = DatabaseValue::String(full_response.to_string());

    let updated = match coordinates {
        Some(Coordinates {
            latitude,
            longitude,
        }) => {
            db.exec_raw_params(
                &format!(
                    "UPDATE {table}
                     SET latitude = $1::float8,
                         longitude = $2::float8,
                         full_response = $3::text::jsonb
                     WHERE id = $4::bigint"
                ),
                &[
                    DatabaseValue::Real64(latitude),
                    DatabaseValue::Real64(longitude),
                    response,
                    DatabaseValue::Int64(id),
                ],
            )
            .await?
        }
        None => {
            db.exec_raw_params(
                &format!(
                    "UPDATE {table}
                     SET full_response = $1::text::jsonb
                     WHERE id = $2::bigint"
                ),
                &[response, DatabaseValue::Int64(id)],
            )
            .await?
        }
    };

    if updated == 0 {
        return Err(DbError::RecordNotFound { table, id });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_condition_only_checks_response() {
        let (sql, params) = pending_condition(RecordCategory::Intersection, 1);
        assert_eq!(sql, "full_response IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn street_address_condition_binds_every_pattern() {
        let (sql, params) = pending_condition(RecordCategory::StreetAddress, 1);
        assert!(sql.starts_with("full_response IS NULL"));
        assert_eq!(params.len(), NON_GEOCODABLE_PATTERNS.len() + 2);
        assert_eq!(sql.matches("NOT ILIKE").count(), NON_GEOCODABLE_PATTERNS.len());
        assert!(sql.contains("~* $6::text"));
        assert!(sql.contains("off_street_name ~ $7::text"));
    }

    #[test]
    fn street_address_condition_respects_offset() {
        let (sql, _) = pending_condition(RecordCategory::StreetAddress, 3);
        assert!(sql.contains("NOT ILIKE $3::text"));
        assert!(sql.contains("off_street_name ~ $9::text"));
        assert!(!sql.contains("$1::text"));
    }

    #[test]
    fn east_drive_clause_treats_blank_borough_as_absent() {
        let (sql, params) = pending_condition(RecordCategory::StreetAddress, 1);
        assert!(sql.contains(
            "AND NOT (off_street_name ~* $6::text AND COALESCE(TRIM(reported_borough), '') = '')"
        ));
        assert!(matches!(
            &params[5],
            DatabaseValue::String(pattern) if pattern == EAST_DRIVE_PATTERN
        ));
    }
}
