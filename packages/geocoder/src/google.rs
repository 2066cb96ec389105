//! Google Maps Geocoding API client.
//!
//! Each query is a single GET with `address`, `bounds` and `key`
//! parameters. There is no retry: a 400 response is reported as
//! [`GeocodeError::Rejected`] so the caller can skip the record, and any
//! other failure (including other 4xx statuses) is surfaced as-is.
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use collision_geocode_models::BoundingBox;

use crate::service_registry::GeocodingService;
use crate::{GeocodeError, Geocoder};

/// Geocoder backed by the Google Maps Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    bounds: String,
    api_key: String,
}

impl GoogleGeocoder {
    /// Creates a client for `base_url`, biasing results toward `bounds`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        bounds: &BoundingBox,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            bounds: bounds.to_viewport_param(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client from an embedded service definition.
    #[must_use]
    pub fn from_service(
        client: reqwest::Client,
        service: &GeocodingService,
        api_key: impl Into<String>,
    ) -> Self {
        Self::new(client, service.base_url.clone(), &service.bounds, api_key)
    }

    /// The `bounds` parameter sent with every request.
    #[must_use]
    pub fn bounds_param(&self) -> &str {
        &self.bounds
    }
}

#[async_trait::async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<serde_json::Value, GeocodeError> {
        log::debug!("Geocoding '{address}'");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("address", address),
                ("bounds", self.bounds.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(GeocodeError::Rejected {
                status: status.as_u16(),
            });
        }
        if status.is_client_error() {
            return Err(GeocodeError::Client {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(GeocodeError::Server {
                status: status.as_u16(),
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| GeocodeError::Parse {
            message: format!("Invalid JSON from geocoder: {e}"),
        })
    }
}
