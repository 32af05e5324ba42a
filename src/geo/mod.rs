//! Geocoding module
//!
//! Turns destination strings into coordinates: the external geocoder, the
//! curated manual table, the shared cache, and the resolvers built on them.

pub mod batch;
pub mod cache;
pub mod manual;
pub mod nominatim;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use batch::BatchResolver;
pub use cache::CoordinateCache;
pub use resolver::{CoordinateResolver, Resolution, ResolutionSource};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Geocode a location string to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(&self, query: &str) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;
}

/// Get the geocoding backend described by the configuration
pub fn get_geocoder(config: &Config) -> Result<nominatim::NominatimBackend> {
    nominatim::NominatimBackend::with_endpoint(
        &config.geocoding.endpoint,
        &config.geocoding.user_agent,
    )
}
