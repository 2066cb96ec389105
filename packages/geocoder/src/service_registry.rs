//! Compile-time geocoding service configuration.
//!
//! The Google endpoint and its viewport bias are defined in
//! `services/google.toml`, embedded at compile time and exposed via
//! [`google_service`].

use collision_geocode_models::BoundingBox;
use serde::Deserialize;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"google"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Endpoint receiving the `address`/`bounds`/`key` query.
    pub base_url: String,
    /// Viewport used to bias results toward the city.
    pub bounds: BoundingBox,
}

const GOOGLE_TOML: &str = include_str!("../services/google.toml");

/// Returns the Google Maps Geocoding API configuration.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn google_service() -> GeocodingService {
    toml::de::from_str(GOOGLE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'google': {e}"))
}
