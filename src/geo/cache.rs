//! Shared destination coordinate cache
//!
//! One instance is shared (behind an `Arc`) by the record store and the
//! resolver. Every entry is a complete coordinate pair; writes go through a
//! lock so the HTTP server can share it across tasks.

use crate::coord::Coordinates;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Destination -> coordinates mapping
#[derive(Debug, Default)]
pub struct CoordinateCache {
    entries: RwLock<HashMap<String, Coordinates>>,
}

impl CoordinateCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-filled from persisted entries
    pub fn from_entries(entries: HashMap<String, Coordinates>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    // A panicking writer cannot leave a half-written pair behind, so a
    // poisoned lock still holds consistent data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Coordinates>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Coordinates>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, destination: &str) -> Option<Coordinates> {
        self.read().get(destination).copied()
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.read().contains_key(destination)
    }

    pub fn insert(&self, destination: impl Into<String>, coords: Coordinates) {
        self.write().insert(destination.into(), coords);
    }

    pub fn remove(&self, destination: &str) -> Option<Coordinates> {
        self.write().remove(destination)
    }

    /// Replace every entry at once
    pub fn replace_all(&self, entries: HashMap<String, Coordinates>) {
        *self.write() = entries;
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Copy of all entries, for persistence
    pub fn snapshot(&self) -> HashMap<String, Coordinates> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_insert_and_get() {
        let cache = CoordinateCache::new();
        assert!(cache.is_empty());

        cache.insert("Bergen, Norge", Coordinates::new(60.3913, 5.3221));
        assert_eq!(cache.get("Bergen, Norge"), Some(Coordinates::new(60.3913, 5.3221)));
        assert!(cache.get("Oslo, Norge").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_snapshot_and_replace() {
        let cache = CoordinateCache::new();
        cache.insert("A", Coordinates::new(1.0, 1.0));

        let snapshot = cache.snapshot();
        cache.clear();
        assert!(cache.is_empty());

        cache.replace_all(snapshot);
        assert_eq!(cache.get("A"), Some(Coordinates::new(1.0, 1.0)));
    }

    #[test]
    fn test_shared_between_threads() {
        let cache = Arc::new(CoordinateCache::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.insert(format!("dest-{}", i), Coordinates::new(i as f64, i as f64));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get("dest-3"), Some(Coordinates::new(3.0, 3.0)));
    }

    #[test]
    fn test_remove() {
        let cache = CoordinateCache::from_entries(HashMap::from([(
            "Kaunas, Litauen".to_string(),
            Coordinates::new(54.8985, 23.9036),
        )]));
        assert!(cache.contains("Kaunas, Litauen"));
        assert!(cache.remove("Kaunas, Litauen").is_some());
        assert!(!cache.contains("Kaunas, Litauen"));
    }
}
