#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Collision location record types.
//!
//! Collision locations come in two categories: intersections (an on-street
//! plus a cross-street) and street addresses (a single off-street name).
//! Both live in their own table and share the geocoding columns
//! (`latitude`, `longitude`, `full_response`). A record whose
//! `full_response` is set has already been processed.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Which kind of collision location a record describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RecordCategory {
    /// Two streets crossing (`on_street_name` and `cross_street_name`).
    Intersection,
    /// A single street address (`off_street_name`).
    StreetAddress,
}

impl RecordCategory {
    /// Categories in the order the runner processes them.
    pub const ALL: &[Self] = &[Self::Intersection, Self::StreetAddress];

    /// Database table holding records of this category.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Intersection => "intersection_geocodings",
            Self::StreetAddress => "street_address_geocodings",
        }
    }

    /// Name used in progress output.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Intersection => "IntersectionGeocoding",
            Self::StreetAddress => "StreetAddressGeocoding",
        }
    }

    /// Google result `types` whose coordinates are trusted for this
    /// category. A result with none of these types is stored without
    /// coordinates.
    #[must_use]
    pub const fn accepted_result_types(self) -> &'static [&'static str] {
        match self {
            Self::Intersection => &["intersection"],
            Self::StreetAddress => &["street_address", "premise"],
        }
    }
}

/// Substrings (matched case-insensitively) marking an off-street name the
/// geocoder cannot resolve: parking lots, driveways and the like.
pub const NON_GEOCODABLE_PATTERNS: &[&str] =
    &["parking lot", "p/l", "pl of", "muni lot", "driveway"];

/// Case-insensitive pattern for Central Park's "East Drive" house numbers,
/// which are only geocodable when a borough narrows them down.
pub const EAST_DRIVE_PATTERN: &str = r"^\d+ east drive";

/// Pattern an off-street name must match to carry a house number.
pub const HOUSE_NUMBER_PATTERN: &str = r"\d";

/// Category-specific address columns of a collision location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum CollisionLocation {
    /// An intersection of two streets.
    Intersection {
        /// Street the collision happened on.
        on_street_name: Option<String>,
        /// Street crossing `on_street_name`.
        cross_street_name: Option<String>,
    },
    /// A street address.
    StreetAddress {
        /// Free-text street address.
        off_street_name: Option<String>,
    },
}

impl CollisionLocation {
    /// Returns the category of this location.
    #[must_use]
    pub const fn category(&self) -> RecordCategory {
        match self {
            Self::Intersection { .. } => RecordCategory::Intersection,
            Self::StreetAddress { .. } => RecordCategory::StreetAddress,
        }
    }
}

/// A collision location row awaiting (or holding) a geocode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionLocationRecord {
    /// Primary key within the category's table.
    pub id: i64,
    /// Address columns.
    pub location: CollisionLocation,
    /// Borough as reported on the collision, if any.
    pub reported_borough: Option<String>,
    /// Latitude (WGS84), set when a result was accepted.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), set when a result was accepted.
    pub longitude: Option<f64>,
    /// Raw geocoder response. Its presence marks the record processed.
    pub full_response: Option<serde_json::Value>,
}

impl CollisionLocationRecord {
    /// Returns the category of this record.
    #[must_use]
    pub const fn category(&self) -> RecordCategory {
        self.location.category()
    }

    /// Whether a geocoder response has already been stored.
    #[must_use]
    pub const fn is_processed(&self) -> bool {
        self.full_response.is_some()
    }
}

/// A point resolved by the geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Renders the box as a Google `bounds` viewport bias:
    /// `"{south},{west}|{north},{east}"`.
    ///
    /// Uses `Debug` formatting so whole-degree bounds keep their `.0`.
    #[must_use]
    pub fn to_viewport_param(&self) -> String {
        format!(
            "{:?},{:?}|{:?},{:?}",
            self.south, self.west, self.north, self.east
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn nyc_viewport_param() {
        let bbox = BoundingBox::new(-74.3, 40.4, -73.65, 41.0);
        assert_eq!(bbox.to_viewport_param(), "40.4,-74.3|41.0,-73.65");
    }

    #[test]
    fn category_parses_from_cli_names() {
        assert_eq!(
            RecordCategory::from_str("intersection").unwrap(),
            RecordCategory::Intersection
        );
        assert_eq!(
            RecordCategory::from_str("street-address").unwrap(),
            RecordCategory::StreetAddress
        );
        assert!(RecordCategory::from_str("borough").is_err());
    }

    #[test]
    fn all_matches_iteration_order() {
        let iterated: Vec<RecordCategory> = RecordCategory::iter().collect();
        assert_eq!(iterated, RecordCategory::ALL);
    }

    #[test]
    fn categories_use_distinct_tables() {
        assert_ne!(
            RecordCategory::Intersection.table_name(),
            RecordCategory::StreetAddress.table_name()
        );
    }

    #[test]
    fn record_is_processed_once_response_is_stored() {
        let mut record = CollisionLocationRecord {
            id: 7,
            location: CollisionLocation::StreetAddress {
                off_street_name: Some("12 MAIN ST".to_string()),
            },
            reported_borough: None,
            latitude: None,
            longitude: None,
            full_response: None,
        };
        assert!(!record.is_processed());
        assert_eq!(record.category(), RecordCategory::StreetAddress);

        record.full_response = Some(serde_json::json!({ "results": [] }));
        assert!(record.is_processed());
    }
}
