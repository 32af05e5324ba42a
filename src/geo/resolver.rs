//! Destination to coordinate resolution
//!
//! Resolution order, first match wins:
//! 1. the curated manual table
//! 2. the shared coordinate cache
//! 3. one geocoder lookup (result is cached on success)
//! 4. the sentinel coordinate (never cached, so a later call retries)
//!
//! `resolve` never fails; every failure degrades to the sentinel with a
//! warning in the log.

use crate::coord::Coordinates;
use crate::geo::cache::CoordinateCache;
use crate::geo::manual::ManualTable;
use crate::geo::GeoBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a resolved coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Curated manual table
    Manual,
    /// Previously geocoded value
    Cache,
    /// Fresh geocoder result
    Geocoder,
    /// Geocoder was asked and failed
    Fallback,
    /// Blank input, nothing was looked up
    Blank,
}

impl ResolutionSource {
    /// True if resolving issued a request to the external geocoder
    pub fn hit_network(&self) -> bool {
        matches!(self, Self::Geocoder | Self::Fallback)
    }
}

/// Result of resolving one destination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub coords: Coordinates,
    pub source: ResolutionSource,
}

impl Resolution {
    fn new(coords: Coordinates, source: ResolutionSource) -> Self {
        Self { coords, source }
    }

    fn sentinel(source: ResolutionSource) -> Self {
        Self::new(Coordinates::sentinel(), source)
    }

    /// True if the destination was actually located
    pub fn is_located(&self) -> bool {
        !matches!(self.source, ResolutionSource::Fallback | ResolutionSource::Blank)
    }
}

/// Strip a trailing `;`-separated annotation from a destination
///
/// `"Porto, Portugal; två resor"` becomes `"Porto, Portugal"`.
pub fn clean_query(destination: &str) -> &str {
    destination
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}

/// Resolves destinations using the manual table, cache and a geocoder
#[derive(Debug)]
pub struct CoordinateResolver<B> {
    backend: B,
    manual: ManualTable,
    cache: Arc<CoordinateCache>,
}

impl<B: GeoBackend> CoordinateResolver<B> {
    /// Create a resolver with the built-in manual table
    pub fn new(backend: B, cache: Arc<CoordinateCache>) -> Self {
        Self {
            backend,
            manual: ManualTable::builtin(),
            cache,
        }
    }

    /// Replace the manual table
    pub fn with_manual_table(mut self, manual: ManualTable) -> Self {
        self.manual = manual;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn manual_table(&self) -> &ManualTable {
        &self.manual
    }

    pub fn cache(&self) -> &Arc<CoordinateCache> {
        &self.cache
    }

    /// Resolve a destination to coordinates
    pub async fn resolve(&self, destination: &str) -> Resolution {
        if destination.trim().is_empty() {
            return Resolution::sentinel(ResolutionSource::Blank);
        }

        if let Some(coords) = self.manual.get(destination) {
            return Resolution::new(coords, ResolutionSource::Manual);
        }

        if let Some(coords) = self.cache.get(destination) {
            return Resolution::new(coords, ResolutionSource::Cache);
        }

        let query = clean_query(destination);
        if query.is_empty() {
            debug!("Nothing to geocode in destination {:?}", destination);
            return Resolution::sentinel(ResolutionSource::Blank);
        }

        match self.backend.geocode(query).await {
            Ok(Some(location)) => {
                let coords = Coordinates::new(location.lat, location.lng);
                if let Err(e) = coords.validate() {
                    warn!("Could not geocode {}: {}", destination, e);
                    return Resolution::sentinel(ResolutionSource::Fallback);
                }
                debug!("Geocoded {} to {}", destination, coords);
                self.cache.insert(destination, coords);
                Resolution::new(coords, ResolutionSource::Geocoder)
            }
            Ok(None) => {
                warn!("Could not geocode {}: no results", destination);
                Resolution::sentinel(ResolutionSource::Fallback)
            }
            Err(e) => {
                warn!("Could not geocode {}: {}", destination, e);
                Resolution::sentinel(ResolutionSource::Fallback)
            }
        }
    }
}
