//! Record store
//!
//! Owns the exchange list and shares the destination coordinate cache with
//! the resolver. Everything here is in memory; `load` and `save` move the
//! state to and from a key-value collaborator under the `"exchanges"` and
//! `"coordinates"` keys.

pub mod csv;
pub mod filter;
pub mod persist;

use crate::constants::storage::{COORDINATES_KEY, EXCHANGES_KEY};
use crate::coord::Coordinates;
use crate::error::Result;
use crate::exchange::{Category, ExchangeRecord, NewExchange};
use crate::geo::CoordinateCache;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

pub use filter::FilterState;
pub use persist::{JsonFileStore, KeyValueStore, MemoryStore};

/// Summary counts for a set of exchanges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    /// Distinct countries, taken from the text after the first comma
    pub countries: usize,
    pub by_category: BTreeMap<Category, usize>,
}

impl Stats {
    /// Compute counts over any set of records
    pub fn of<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ExchangeRecord>,
    {
        let mut stats = Self::default();
        let mut countries = HashSet::new();

        for record in records {
            stats.total += 1;
            if let Some(country) = record.country() {
                countries.insert(country);
            }
            *stats.by_category.entry(record.category).or_insert(0) += 1;
        }

        stats.countries = countries.len();
        stats
    }
}

/// In-memory exchange records plus the shared coordinate cache
#[derive(Debug)]
pub struct ExchangeStore {
    exchanges: Vec<ExchangeRecord>,
    coordinates: Arc<CoordinateCache>,
    next_id: u64,
}

impl ExchangeStore {
    /// Create an empty store around a shared cache
    pub fn new(coordinates: Arc<CoordinateCache>) -> Self {
        Self {
            exchanges: Vec::new(),
            coordinates,
            next_id: 1,
        }
    }

    /// The cache shared with the resolver
    pub fn coordinates(&self) -> &Arc<CoordinateCache> {
        &self.coordinates
    }

    pub fn exchanges(&self) -> &[ExchangeRecord] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ExchangeRecord> {
        self.exchanges.iter().find(|e| e.id == id)
    }

    /// Distinct non-blank destinations in first-seen order
    pub fn unique_destinations(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.exchanges
            .iter()
            .map(|e| e.destination.as_str())
            .filter(|d| !d.trim().is_empty() && seen.insert(*d))
            .map(str::to_string)
            .collect()
    }

    pub fn get_coordinate(&self, destination: &str) -> Option<Coordinates> {
        self.coordinates.get(destination)
    }

    pub fn set_coordinate(&self, destination: impl Into<String>, coords: Coordinates) {
        self.coordinates.insert(destination, coords);
    }

    /// Records matching every active predicate of `filter`
    pub fn filter(&self, filter: &FilterState) -> Vec<&ExchangeRecord> {
        self.exchanges.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Case-insensitive text search over all records
    pub fn search(&self, query: &str) -> Vec<&ExchangeRecord> {
        let needle = query.trim().to_lowercase();
        self.exchanges
            .iter()
            .filter(|e| needle.is_empty() || e.matches_text(&needle))
            .collect()
    }

    /// Validate and append a record with a fresh id
    pub fn add(&mut self, fields: NewExchange) -> Result<ExchangeRecord> {
        let fields = fields.validated()?;
        Ok(self.push(fields))
    }

    /// Append an imported row, which needs only a destination
    pub fn append(&mut self, fields: NewExchange) -> Result<ExchangeRecord> {
        let fields = fields.normalized()?;
        Ok(self.push(fields))
    }

    fn push(&mut self, fields: NewExchange) -> ExchangeRecord {
        let record = ExchangeRecord::new(self.next_id, fields);
        self.next_id += 1;
        self.exchanges.push(record.clone());
        debug!("Added exchange {} ({})", record.id, record.destination);
        record
    }

    /// Replace every record, numbering them from 1
    pub fn replace_all(&mut self, rows: Vec<NewExchange>) {
        self.exchanges = rows
            .into_iter()
            .zip(1..)
            .map(|(fields, id)| ExchangeRecord::new(id, fields))
            .collect();
        self.next_id = self.exchanges.len() as u64 + 1;
    }

    /// Validate and replace the fields of an existing record
    ///
    /// Returns `Ok(None)` if no record has this id.
    pub fn update(&mut self, id: u64, fields: NewExchange) -> Result<Option<ExchangeRecord>> {
        let fields = fields.validated()?;
        let Some(record) = self.exchanges.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        *record = ExchangeRecord::new(id, fields);
        Ok(Some(record.clone()))
    }

    /// Remove a record; false if no record has this id
    pub fn delete(&mut self, id: u64) -> bool {
        match self.exchanges.iter().position(|e| e.id == id) {
            Some(index) => {
                self.exchanges.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every record and every cached coordinate
    pub fn clear(&mut self) {
        self.exchanges.clear();
        self.coordinates.clear();
        self.next_id = 1;
    }

    pub fn unique_activities(&self) -> Vec<String> {
        sorted_unique(self.exchanges.iter().map(|e| e.activity.as_str()))
    }

    pub fn unique_schools(&self) -> Vec<String> {
        sorted_unique(self.exchanges.iter().map(|e| e.school.as_str()))
    }

    pub fn unique_categories(&self) -> Vec<Category> {
        self.exchanges
            .iter()
            .map(|e| e.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.exchanges)
    }

    /// Load records and coordinates from persisted state
    ///
    /// Returns false, leaving the store untouched, unless both keys exist.
    pub fn load(&mut self, persist: &dyn KeyValueStore) -> Result<bool> {
        let (Some(exchanges), Some(coordinates)) =
            (persist.get(EXCHANGES_KEY)?, persist.get(COORDINATES_KEY)?)
        else {
            return Ok(false);
        };

        let exchanges: Vec<ExchangeRecord> = serde_json::from_str(&exchanges)?;
        let coordinates: HashMap<String, Coordinates> = serde_json::from_str(&coordinates)?;

        self.next_id = exchanges.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.exchanges = exchanges;
        self.coordinates.replace_all(coordinates);
        Ok(true)
    }

    /// Save records and coordinates
    pub fn save(&self, persist: &mut dyn KeyValueStore) -> Result<()> {
        persist.set(EXCHANGES_KEY, serde_json::to_string(&self.exchanges)?)?;
        persist.set(COORDINATES_KEY, serde_json::to_string(&self.coordinates.snapshot())?)?;
        Ok(())
    }
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
