//! Rate-limited batch resolution
//!
//! Resolves many destinations one after another. After every resolution that
//! went to the geocoder the batch waits a fixed interval before moving on,
//! which keeps us within Nominatim's one-request-per-second policy. Manual
//! and cache hits cost no wait, and there is never a wait after the last
//! destination.

use crate::constants::api::GEOCODE_INTERVAL_MS;
use crate::coord::Coordinates;
use crate::geo::resolver::{CoordinateResolver, Resolution};
use crate::geo::GeoBackend;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

/// Sequential resolver with a pause between geocoder requests
pub struct BatchResolver<'a, B> {
    resolver: &'a CoordinateResolver<B>,
    interval: Duration,
}

impl<'a, B: GeoBackend> BatchResolver<'a, B> {
    /// Batch over `resolver` with the default one second interval
    pub fn new(resolver: &'a CoordinateResolver<B>) -> Self {
        Self {
            resolver,
            interval: Duration::from_millis(GEOCODE_INTERVAL_MS),
        }
    }

    /// Override the pause between geocoder requests
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Resolve every distinct non-blank destination
    pub async fn resolve_all<I, S>(&self, destinations: I) -> HashMap<String, Coordinates>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_each(destinations)
            .await
            .into_iter()
            .map(|(destination, resolution)| (destination, resolution.coords))
            .collect()
    }

    /// Like `resolve_all`, keeping input order and the source of each result
    pub async fn resolve_each<I, S>(&self, destinations: I) -> Vec<(String, Resolution)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pending = unique_destinations(destinations);
        let total = pending.len();
        let mut results = Vec::with_capacity(total);

        info!("Resolving {} destinations", total);

        for (index, destination) in pending.into_iter().enumerate() {
            let resolution = self.resolver.resolve(&destination).await;
            debug!(
                "[{}/{}] {} -> {} ({:?})",
                index + 1,
                total,
                destination,
                resolution.coords,
                resolution.source
            );

            let is_last = index + 1 == total;
            if resolution.source.hit_network() && !is_last && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }

            results.push((destination, resolution));
        }

        let unresolved = results.iter().filter(|(_, r)| !r.is_located()).count();
        info!("Resolved {} destinations ({} unresolved)", total, unresolved);

        results
    }
}

/// Distinct non-blank destinations in first-seen order
fn unique_destinations<I, S>(destinations: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    destinations
        .into_iter()
        .map(|d| d.as_ref().to_string())
        .filter(|d| !d.trim().is_empty())
        .filter(|d| seen.insert(d.clone()))
        .collect()
}
