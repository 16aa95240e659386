//! Reverse geocoding: coordinate to human-readable place label.
//!
//! Labels are best effort. A [`ReverseGeocoder`] never fails; when the
//! lookup goes wrong it hands back one of the placeholder labels instead.

use crate::error::GeocodeError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;
use unswachh_types::report::{LOCATION_UNAVAILABLE, UNKNOWN_LOCATION};
use unswachh_types::Coordinate;

/// Default public Nominatim instance.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Default timeout for geocoding requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Turns a coordinate into a place label.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Label for `coordinate`, or a placeholder if none could be resolved.
    async fn label_for(&self, coordinate: &Coordinate) -> String;
}

/// Address components from a Nominatim `reverse` response.
#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub amenity: Option<String>,
    pub shop: Option<String>,
    pub building: Option<String>,
    pub tourism: Option<String>,
    pub historic: Option<String>,
    pub leisure: Option<String>,
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub pedestrian: Option<String>,
    pub footway: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub residential: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
}

/// Raw JSON response of `GET /reverse?format=json`.
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<NominatimAddress>,
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| (*c).as_deref())
        .find(|s| !s.trim().is_empty())
}

/// Compose a readable label from address parts.
///
/// Order: specific place name, house number, street, neighbourhood,
/// settlement, state. Falls back to the display name, then to
/// [`UNKNOWN_LOCATION`].
pub fn format_label(response: &NominatimResponse) -> String {
    let fallback = || {
        response
            .display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN_LOCATION)
            .to_string()
    };

    let Some(address) = &response.address else {
        return fallback();
    };

    let parts: Vec<&str> = [
        first_present(&[
            &address.amenity,
            &address.shop,
            &address.building,
            &address.tourism,
            &address.historic,
            &address.leisure,
        ]),
        first_present(&[&address.house_number]),
        first_present(&[&address.road, &address.pedestrian, &address.footway]),
        first_present(&[&address.suburb, &address.neighbourhood, &address.residential]),
        first_present(&[&address.city, &address.town, &address.village, &address.county]),
        first_present(&[&address.state]),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        fallback()
    } else {
        parts.join(", ")
    }
}

/// Reverse geocoder backed by a Nominatim HTTP endpoint.
pub struct NominatimGeocoder {
    http_client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Create a geocoder for `base_url`, identifying as `user_agent`.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .user_agent(user_agent.to_string())
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public Nominatim with default timeouts.
    pub fn public(user_agent: &str) -> Self {
        Self::new(DEFAULT_NOMINATIM_URL, user_agent, DEFAULT_TIMEOUT)
    }

    /// Look up a label, surfacing every failure.
    pub async fn lookup(&self, coordinate: &Coordinate) -> Result<String, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", coordinate.latitude().to_string()),
                ("lon", coordinate.longitude().to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    GeocodeError::Unreachable(e.to_string())
                } else {
                    GeocodeError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(GeocodeError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        Ok(format_label(&body))
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn label_for(&self, coordinate: &Coordinate) -> String {
        match self.lookup(coordinate).await {
            Ok(label) => label,
            Err(e) => {
                warn!(%coordinate, error = %e, "reverse geocoding failed");
                LOCATION_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> NominatimResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn composes_specific_name_street_and_city() {
        let response = parse(
            r#"{
                "display_name": "long display name",
                "address": {
                    "amenity": "Cubbon Park",
                    "road": "Kasturba Road",
                    "suburb": "Sampangi Rama Nagar",
                    "city": "Bengaluru",
                    "state": "Karnataka",
                    "postcode": "560001"
                }
            }"#,
        );
        assert_eq!(
            format_label(&response),
            "Cubbon Park, Kasturba Road, Sampangi Rama Nagar, Bengaluru, Karnataka"
        );
    }

    #[test]
    fn prefers_earlier_alternatives() {
        let response = parse(
            r#"{"address": {
                "pedestrian": "Mall Road",
                "footway": "ignored",
                "village": "Kufri",
                "county": "Shimla"
            }}"#,
        );
        assert_eq!(format_label(&response), "Mall Road, Kufri");
    }

    #[test]
    fn falls_back_to_display_name_then_placeholder() {
        assert_eq!(
            format_label(&parse(r#"{"display_name": "Somewhere, India"}"#)),
            "Somewhere, India"
        );
        assert_eq!(
            format_label(&parse(r#"{"display_name": "Only this", "address": {"postcode": "1"}}"#)),
            "Only this"
        );
        assert_eq!(format_label(&parse(r#"{}"#)), UNKNOWN_LOCATION);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_placeholder() {
        let geocoder = NominatimGeocoder::new(
            "http://127.0.0.1:9",
            "unswachh-test",
            Duration::from_millis(200),
        );
        let c = Coordinate::new(12.9716, 77.5946).unwrap();
        assert_eq!(geocoder.label_for(&c).await, LOCATION_UNAVAILABLE);
    }
}
