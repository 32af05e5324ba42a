//! Location aggregation
//!
//! Groups exchanges sharing a destination so the map shows one marker per
//! place, with every exchange for that place in its detail view.

use crate::coord::Coordinates;
use crate::exchange::{Category, ExchangeRecord};
use crate::geo::CoordinateCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Exchanges that share a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub destination: String,
    pub records: Vec<ExchangeRecord>,
}

/// One map entity: a located destination and its exchanges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub destination: String,
    pub coords: Coordinates,
    /// Category used for the marker style, taken from the first exchange
    pub category: Category,
    pub records: Vec<ExchangeRecord>,
}

impl MapMarker {
    /// Header line of the combined detail view
    pub fn summary(&self) -> String {
        let count = self.records.len();
        let noun = if count == 1 { "utbyte" } else { "utbyten" };
        format!("{} ({} {})", self.destination, count, noun)
    }
}

/// Group records by destination
///
/// Groups appear in the order their destination is first seen; records keep
/// their input order within a group.
pub fn group_by_destination<'a, I>(records: I) -> Vec<LocationGroup>
where
    I: IntoIterator<Item = &'a ExchangeRecord>,
{
    let mut groups: Vec<LocationGroup> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for record in records {
        match index.get(record.destination.as_str()) {
            Some(&i) => groups[i].records.push(record.clone()),
            None => {
                index.insert(record.destination.as_str(), groups.len());
                groups.push(LocationGroup {
                    destination: record.destination.clone(),
                    records: vec![record.clone()],
                });
            }
        }
    }

    groups
}

/// Turn groups into markers, dropping destinations without a location
///
/// A destination is unlocated when it has no cached coordinate or its
/// coordinate equals the sentinel. Unlocated destinations are logged and
/// not plotted.
pub fn build_markers(groups: Vec<LocationGroup>, coordinates: &CoordinateCache) -> Vec<MapMarker> {
    groups
        .into_iter()
        .filter_map(|group| {
            let coords = match coordinates.get(&group.destination) {
                Some(coords) if !coords.is_sentinel() => coords,
                _ => {
                    warn!("No coordinates for: {}", group.destination);
                    return None;
                }
            };
            let category = group.records.first()?.category;

            Some(MapMarker {
                destination: group.destination,
                coords,
                category,
                records: group.records,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::NewExchange;

    fn record(id: u64, destination: &str, category: Category) -> ExchangeRecord {
        ExchangeRecord::new(id, NewExchange::new(destination, "Praktik", "Skola A", category))
    }

    fn sample() -> Vec<ExchangeRecord> {
        vec![
            record(1, "Porto, Portugal", Category::Erasmus),
            record(2, "Porto, Portugal", Category::Nordplus),
            record(3, "Wien, Österrike", Category::Tca),
        ]
    }

    #[test]
    fn test_group_by_destination() {
        let records = sample();
        let groups = group_by_destination(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].destination, "Porto, Portugal");
        let ids: Vec<u64> = groups[0].records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(groups[1].destination, "Wien, Österrike");
        assert_eq!(groups[1].records[0].id, 3);
    }

    #[test]
    fn test_group_order_follows_first_appearance() {
        let records = vec![
            record(1, "B", Category::Atlas),
            record(2, "A", Category::Atlas),
            record(3, "B", Category::Atlas),
            record(4, "C", Category::Atlas),
            record(5, "A", Category::Atlas),
        ];
        let groups = group_by_destination(&records);

        let order: Vec<&str> = groups.iter().map(|g| g.destination.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        let a_ids: Vec<u64> = groups[1].records.iter().map(|r| r.id).collect();
        assert_eq!(a_ids, vec![2, 5]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_by_destination(&Vec::<ExchangeRecord>::new()).is_empty());
    }

    #[test]
    fn test_markers_use_first_category() {
        let cache = CoordinateCache::new();
        cache.insert("Porto, Portugal", Coordinates::new(41.1579, -8.6291));
        cache.insert("Wien, Österrike", Coordinates::new(48.2082, 16.3738));

        let records = sample();
        let markers = build_markers(group_by_destination(&records), &cache);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].category, Category::Erasmus);
        assert_eq!(markers[0].records.len(), 2);
        assert_eq!(markers[1].coords, Coordinates::new(48.2082, 16.3738));
    }

    #[test]
    fn test_unlocated_destinations_are_skipped() {
        let cache = CoordinateCache::new();
        cache.insert("Porto, Portugal", Coordinates::sentinel());

        let records = sample();
        let markers = build_markers(group_by_destination(&records), &cache);

        // Porto sits on the sentinel, Wien has no entry at all
        assert!(markers.is_empty());
    }

    #[test]
    fn test_summary() {
        let cache = CoordinateCache::new();
        cache.insert("Porto, Portugal", Coordinates::new(41.1579, -8.6291));
        cache.insert("Wien, Österrike", Coordinates::new(48.2082, 16.3738));

        let records = sample();
        let markers = build_markers(group_by_destination(&records), &cache);
        assert_eq!(markers[0].summary(), "Porto, Portugal (2 utbyten)");
        assert_eq!(markers[1].summary(), "Wien, Österrike (1 utbyte)");
    }
}
