//! Interpretation of Google Geocoding API response bodies.
//!
//! Only the first result is considered. Its coordinates are trusted when
//! the result's `types` overlap the category's accepted types (e.g. an
//! intersection query must come back as an `intersection`, not a `route`).
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use collision_geocode_models::{Coordinates, RecordCategory};

/// Top-level `status` values that mean the request itself was served.
const SERVED_STATUSES: &[&str] = &["OK", "ZERO_RESULTS"];

/// Returns the coordinates of the first result if its type is accepted for
/// `category` and it carries a numeric location.
#[must_use]
pub fn accepted_location(
    body: &serde_json::Value,
    category: RecordCategory,
) -> Option<Coordinates> {
    let first = body["results"].as_array()?.first()?;

    let accepted = category.accepted_result_types();
    let type_matches = first["types"]
        .as_array()
        .is_some_and(|types| {
            types
                .iter()
                .filter_map(serde_json::Value::as_str)
                .any(|t| accepted.contains(&t))
        });

    if !type_matches {
        return None;
    }

    let location = &first["geometry"]["location"];

    Some(Coordinates {
        latitude: location["lat"].as_f64()?,
        longitude: location["lng"].as_f64()?,
    })
}

/// Returns the top-level `status` when it signals that Google did not serve
/// the request (`OVER_QUERY_LIMIT`, `REQUEST_DENIED`, ...).
#[must_use]
pub fn unserved_status(body: &serde_json::Value) -> Option<&str> {
    body["status"]
        .as_str()
        .filter(|status| !SERVED_STATUSES.contains(status))
}
