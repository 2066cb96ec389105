//! Query address formatting for collision locations.
//!
//! Collision records carry their location as free text:
//! - Intersections: `"BROADWAY"` + `"WEST 42 STREET"`
//! - Street addresses: `"1040     BROADWAY"`
//!
//! Both are turned into a lower-cased one-line query ending in `nyc`,
//! optionally preceded by the reported borough. This module also holds the
//! in-process form of the rules deciding which street addresses are worth
//! sending to the geocoder at all. The patterns live in
//! `collision_geocode_models` so the database layer builds its selection
//! `WHERE` clause from the same constants.

use std::sync::LazyLock;

use collision_geocode_models::{
    CollisionLocation, CollisionLocationRecord, EAST_DRIVE_PATTERN, HOUSE_NUMBER_PATTERN,
    NON_GEOCODABLE_PATTERNS,
};
use regex::Regex;
use thiserror::Error;

/// City suffix appended to every query address.
const CITY: &str = "nyc";

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static EAST_DRIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){EAST_DRIVE_PATTERN}")).expect("valid regex"));

static HOUSE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HOUSE_NUMBER_PATTERN).expect("valid regex"));

/// Errors from building a query address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A column required to build the address is null or blank.
    #[error("{id} missing {field}")]
    MissingField {
        /// Record identifier.
        id: i64,
        /// Name of the missing column.
        field: &'static str,
    },
}

/// Builds the query address for a record, dispatching on its category.
///
/// # Errors
///
/// Returns [`AddressError::MissingField`] if a required street name is
/// null or blank.
pub fn address_for_geocode(record: &CollisionLocationRecord) -> Result<String, AddressError> {
    let borough = record.reported_borough.as_deref();

    match &record.location {
        CollisionLocation::Intersection {
            on_street_name,
            cross_street_name,
        } => intersection_address(
            record.id,
            on_street_name.as_deref(),
            cross_street_name.as_deref(),
            borough,
        ),
        CollisionLocation::StreetAddress { off_street_name } => {
            street_address(record.id, off_street_name.as_deref(), borough)
        }
    }
}

/// Formats `"{on} and {cross}, {borough}, nyc"`, lower-cased.
///
/// # Errors
///
/// Returns [`AddressError::MissingField`] if either street name is null or
/// blank.
pub fn intersection_address(
    id: i64,
    on_street_name: Option<&str>,
    cross_street_name: Option<&str>,
    reported_borough: Option<&str>,
) -> Result<String, AddressError> {
    let on = required(id, "on_street_name", on_street_name)?;
    let cross = required(id, "cross_street_name", cross_street_name)?;

    Ok(join_segments(&format!("{on} and {cross}"), reported_borough))
}

/// Formats `"{off_street_name}, {borough}, nyc"`, lower-cased, with runs of
/// whitespace in the street collapsed to single spaces.
///
/// # Errors
///
/// Returns [`AddressError::MissingField`] if the street name is null or
/// blank.
pub fn street_address(
    id: i64,
    off_street_name: Option<&str>,
    reported_borough: Option<&str>,
) -> Result<String, AddressError> {
    let street = required(id, "off_street_name", off_street_name)?;

    Ok(join_segments(&squish(street), reported_borough))
}

/// Whether a street address passes the selection rules: it has a house
/// number, is not a parking lot or driveway, and is not an unqualified
/// "East Drive" address.
#[must_use]
pub fn is_geocodable_street_address(
    off_street_name: Option<&str>,
    reported_borough: Option<&str>,
) -> bool {
    let Some(street) = off_street_name else {
        return false;
    };

    let lowered = street.to_lowercase();
    if NON_GEOCODABLE_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return false;
    }

    if EAST_DRIVE_RE.is_match(street) && non_blank(reported_borough).is_none() {
        return false;
    }

    HOUSE_NUMBER_RE.is_match(street)
}

fn required<'a>(
    id: i64,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, AddressError> {
    non_blank(value).ok_or(AddressError::MissingField { id, field })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Trims and collapses internal whitespace runs.
fn squish(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

fn join_segments(street: &str, reported_borough: Option<&str>) -> String {
    let mut segments = vec![street];
    if let Some(borough) = non_blank(reported_borough) {
        segments.push(borough);
    }
    segments.push(CITY);
    segments.join(", ").to_lowercase()
}
