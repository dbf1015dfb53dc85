//! Address geocoding
//!
//! Bootcamp writes turn the submitted street address into a structured
//! [`Location`] through the [`Geocoder`] port. [`MapQuestGeocoder`] is the
//! HTTP adapter; it owns transport details only (request building, timeout,
//! status mapping and JSON decoding).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::GeocoderConfig;
use crate::error::AppError;
use crate::models::Location;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Geocoding service answered {status}")]
    Status { status: StatusCode },

    #[error("Invalid geocoding response: {0}")]
    Decode(String),

    #[error("No location found for address '{0}'")]
    NoMatch(String),
}

impl From<GeocodeError> for AppError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NoMatch(_) => AppError::validation("Please add a valid address"),
            other => AppError::upstream("Address could not be geocoded", other),
        }
    }
}

/// Resolves a free-form address to coordinates and address parts
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError>;
}

/// MapQuest geocoding API adapter
#[derive(Debug, Clone)]
pub struct MapQuestGeocoder {
    client: Client,
    url: String,
    api_key: String,
}

impl MapQuestGeocoder {
    /// Build an adapter whose requests time out after `timeout`
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &GeocoderConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status { status });
        }

        let body = response.bytes().await?;
        let decoded: MapQuestResponse = serde_json::from_slice(&body)
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        let location = decoded
            .results
            .into_iter()
            .next()
            .and_then(|result| result.locations.into_iter().next())
            .ok_or_else(|| GeocodeError::NoMatch(address.to_string()))?;

        tracing::debug!(
            lat = location.lat_lng.lat,
            lng = location.lat_lng.lng,
            "Address geocoded"
        );

        Ok(location.into())
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: LatLng,
    street: Option<String>,
    /// City
    admin_area5: Option<String>,
    /// State
    admin_area3: Option<String>,
    postal_code: Option<String>,
    /// Country
    admin_area1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<MapQuestLocation> for Location {
    fn from(loc: MapQuestLocation) -> Self {
        let street = non_empty(loc.street);
        let city = non_empty(loc.admin_area5);
        let state = non_empty(loc.admin_area3);
        let zipcode = non_empty(loc.postal_code);
        let country = non_empty(loc.admin_area1);

        let state_zip = match (&state, &zipcode) {
            (Some(s), Some(z)) => Some(format!("{} {}", s, z)),
            (Some(s), None) => Some(s.clone()),
            (None, Some(z)) => Some(z.clone()),
            (None, None) => None,
        };
        let parts: Vec<String> = [street.clone(), city.clone(), state_zip, country.clone()]
            .into_iter()
            .flatten()
            .collect();

        Location {
            longitude: loc.lat_lng.lng,
            latitude: loc.lat_lng.lat,
            formatted_address: (!parts.is_empty()).then(|| parts.join(", ")),
            street,
            city,
            state,
            zipcode,
            country,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn geocoder(server: &MockServer) -> MapQuestGeocoder {
        MapQuestGeocoder::new(
            format!("{}/geocoding/v1/address", server.uri()),
            "test-key",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    fn boston() -> serde_json::Value {
        json!({
            "results": [{
                "providedLocation": {"location": "233 Bay State Rd Boston MA 02215"},
                "locations": [{
                    "street": "233 Bay State Rd",
                    "adminArea5": "Boston",
                    "adminArea3": "MA",
                    "adminArea1": "US",
                    "postalCode": "02215",
                    "latLng": {"lat": 42.350846, "lng": -71.103581}
                }]
            }]
        })
    }

    #[tokio::test]
    async fn test_geocode_maps_first_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocoding/v1/address"))
            .and(query_param("key", "test-key"))
            .and(query_param("location", "233 Bay State Rd Boston MA 02215"))
            .respond_with(ResponseTemplate::new(200).set_body_json(boston()))
            .mount(&server)
            .await;

        let location = geocoder(&server)
            .geocode("233 Bay State Rd Boston MA 02215")
            .await
            .unwrap();

        assert_eq!(location.longitude, -71.103581);
        assert_eq!(location.latitude, 42.350846);
        assert_eq!(location.city.as_deref(), Some("Boston"));
        assert_eq!(location.state.as_deref(), Some("MA"));
        assert_eq!(location.zipcode.as_deref(), Some("02215"));
        assert_eq!(location.country.as_deref(), Some("US"));
        assert_eq!(
            location.formatted_address.as_deref(),
            Some("233 Bay State Rd, Boston, MA 02215, US")
        );
    }

    #[tokio::test]
    async fn test_empty_results_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let err = geocoder(&server).geocode("nowhere").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NoMatch(ref a) if a == "nowhere"));

        let app: AppError = err.into();
        assert!(matches!(app, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = geocoder(&server).geocode("anywhere").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Status { status } if status == StatusCode::FORBIDDEN));

        let app: AppError = err.into();
        assert_eq!(app.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = geocoder(&server).geocode("anywhere").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Decode(_)));
    }
}
