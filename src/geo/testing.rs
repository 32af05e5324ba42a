//! In-process geocoder for tests

use crate::error::{Error, Result};
use crate::geo::{GeoBackend, GeoLocation};
use std::collections::HashMap;
use std::sync::Mutex;

/// Geocoder answering from a fixed table and recording every query
#[derive(Debug, Default)]
pub struct MockGeocoder {
    results: HashMap<String, (f64, f64)>,
    failing: bool,
    queries: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, query: &str, lat: f64, lng: f64) -> Self {
        self.results.insert(query.to_string(), (lat, lng));
        self
    }

    /// Every lookup returns an error
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl GeoBackend for MockGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.failing {
            return Err(Error::Geo("geocoder unavailable".to_string()));
        }

        Ok(self.results.get(query).map(|&(lat, lng)| GeoLocation {
            lat,
            lng,
            display_name: query.to_string(),
        }))
    }
}
