//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim search API. The service requires an identifying
//! User-Agent and allows one request per second; pacing is the caller's job
//! (see `geo::batch`).

use crate::constants::api::{NOMINATIM_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, GeoLocation};
use serde::Deserialize;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    endpoint: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl NominatimBackend {
    /// Create a backend for the public Nominatim instance
    pub fn new() -> Result<Self> {
        Self::with_endpoint(NOMINATIM_URL, USER_AGENT)
    }

    /// Create a backend for a specific Nominatim-compatible endpoint
    pub fn with_endpoint(endpoint: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Geo(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat.trim().parse().map_err(|_| {
            Error::Geo(format!("Invalid latitude: {}", lat))
        })?;
        let lng: f64 = lng.trim().parse().map_err(|_| {
            Error::Geo(format!("Invalid longitude: {}", lng))
        })?;
        Ok((lat, lng))
    }
}

impl GeoBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/search?format=json&q={}&limit=1",
            self.endpoint,
            urlencoding::encode(query)
        );

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geo(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geo(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))?;

        if let Some(result) = results.into_iter().next() {
            let (lat, lng) = Self::parse_coords(&result.lat, &result.lon)?;
            Ok(Some(GeoLocation {
                lat,
                lng,
                display_name: result.display_name,
            }))
        } else {
            Ok(None)
        }
    }
}
