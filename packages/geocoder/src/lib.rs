#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for collision locations.
//!
//! Turns a [`CollisionLocationRecord`](collision_geocode_models::CollisionLocationRecord)
//! into a one-line query address ([`address`]), sends it to the Google Maps
//! Geocoding API ([`google`]) and decides whether the first result is good
//! enough to trust ([`interpret`]).
//!
//! The endpoint and the NYC viewport bias are defined in
//! `services/google.toml` and embedded at compile time
//! ([`service_registry`]).

pub mod address;
pub mod google;
pub mod interpret;
pub mod service_registry;

use thiserror::Error;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider refused this query as malformed (400). The record is
    /// left for manual review.
    #[error("Request rejected with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// Any other client error (401, 403, 429, ...). These concern the key
    /// or quota rather than the query, so every later request would fail
    /// the same way.
    #[error("Client error with status {status}")]
    Client {
        /// HTTP status code.
        status: u16,
    },

    /// The provider failed to handle the request (5xx).
    #[error("Server error with status {status}")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl GeocodeError {
    /// Whether the provider refused this particular query. Such records are
    /// skipped instead of aborting the run.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// A geocoding backend that resolves a query address to the provider's raw
/// JSON response.
///
/// Interpretation of the body is left to [`interpret`] so the raw response
/// can be persisted untouched.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocodes a one-line address.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Rejected`] if the provider refuses the query,
    /// or another [`GeocodeError`] if the request or body decoding fails.
    async fn geocode(&self, address: &str) -> Result<serde_json::Value, GeocodeError>;
}
