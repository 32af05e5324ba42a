//! Curated destination coordinates
//!
//! Ground truth for destinations that appear in the exchange file. Entries
//! here win over cached and geocoded values. Misspelled variants found in the
//! source data are listed alongside the correct spelling.

use crate::coord::Coordinates;
use std::collections::HashMap;

const MANUAL_COORDINATES: &[(&str, f64, f64)] = &[
    ("Elda, Spanien", 38.4783, -0.7972),
    ("Bryssel, Belgien", 50.8503, 4.3517),
    ("Barcelona, Spanien", 41.3874, 2.1686),
    ("Dublin, Irland", 53.3498, -6.2603),
    ("Hannover, Tyskland", 52.3759, 9.7320),
    ("Florens, Italien", 43.7696, 11.2558),
    ("Florence, Italien", 43.7696, 11.2558),
    ("Dabrowa, Polen", 50.3252, 19.1832),
    ("Martorell, Spanien", 41.4729, 1.9269),
    ("Porto, Portugal", 41.1579, -8.6291),
    ("Tallin, Estland", 59.4370, 24.7536),
    ("Nice, Frankrike", 43.7102, 7.2620),
    ("Aten, Grekland", 37.9838, 23.7275),
    ("Kaunas, Litauen", 54.8985, 23.9036),
    ("Split, Kroatien", 43.5081, 16.4402),
    ("Amsterdam, Nederländerna", 52.3676, 4.9041),
    ("Madiera, Portugal", 32.7607, -16.9595),
    ("Budapest, Ungern", 47.4979, 19.0402),
    ("Bergen, Norge", 60.3913, 5.3221),
    ("Kuopio, Finland", 62.8924, 27.6782),
    ("Zagreb, Kroatien", 45.8150, 15.9819),
    ("Essen, Tyskland", 51.4556, 7.0116),
    ("Madrid, Spanien", 40.4168, -3.7038),
    ("Thessaloniki, Grekland", 40.6401, 22.9444),
    ("Salon de Provence, Frankrike", 43.6402, 5.0979),
    ("Teneriffa, Spanien", 28.2916, -16.6291),
    ("Spanien, Teneriffa", 28.2916, -16.6291),
    ("Bergues, Frankrike", 50.9686, 2.4369),
    ("Wien, Österrike", 48.2082, 16.3738),
    ("Hankasalmi, Finland", 62.3886, 26.4331),
    ("Murcia, Spanien", 37.9922, -1.1307),
    ("Murica, Spanien", 37.9922, -1.1307),
    ("Kalamata, Grekland", 37.0391, 22.1142),
    ("Sönderborg, Danmark", 54.9094, 9.7922),
    ("Maroussi, Grekland", 38.0565, 23.8078),
    ("Stellenbosch, Sydafrika", -33.9321, 18.8602),
    ("Siglufjörður, Islandia", 66.1500, -18.9167),
    ("Reykjavík, Island", 64.1466, -21.9426),
    ("Akureyri, Island", 65.6835, -18.1086),
    ("Luxemburg", 49.6116, 6.1319),
    ("Mikkeli, Finland", 61.6875, 27.2721),
    ("Stockholm, Sverige", 59.3293, 18.0686),
    ("Tenhultskolan, Sverige", 57.4403, 14.0636),
];

/// Exact-match lookup table of known destinations
#[derive(Debug, Clone, Default)]
pub struct ManualTable {
    entries: HashMap<String, Coordinates>,
}

impl ManualTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of destinations from the exchange file
    pub fn builtin() -> Self {
        MANUAL_COORDINATES
            .iter()
            .map(|&(name, lat, lng)| (name, Coordinates::new(lat, lng)))
            .collect()
    }

    /// Add or replace an entry
    pub fn with_entry(mut self, destination: impl Into<String>, coords: Coordinates) -> Self {
        self.entries.insert(destination.into(), coords);
        self
    }

    /// Look up a destination by exact string
    pub fn get(&self, destination: &str) -> Option<Coordinates> {
        self.entries.get(destination).copied()
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.entries.contains_key(destination)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Coordinates)> for ManualTable {
    fn from_iter<I: IntoIterator<Item = (S, Coordinates)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = ManualTable::builtin();
        assert_eq!(table.len(), MANUAL_COORDINATES.len());
        assert_eq!(
            table.get("Porto, Portugal"),
            Some(Coordinates::new(41.1579, -8.6291))
        );
        assert_eq!(
            table.get("Murica, Spanien"),
            table.get("Murcia, Spanien")
        );
    }

    #[test]
    fn test_exact_match_only() {
        let table = ManualTable::builtin();
        assert!(table.contains("Wien, Österrike"));
        assert!(!table.contains("wien, österrike"));
        assert!(!table.contains("Wien, Österrike "));
    }

    #[test]
    fn test_builtin_entries_are_valid() {
        for &(name, lat, lng) in MANUAL_COORDINATES {
            let coords = Coordinates::new(lat, lng);
            assert!(coords.validate().is_ok(), "{} out of range", name);
            assert!(!coords.is_sentinel(), "{} equals the sentinel", name);
        }
    }

    #[test]
    fn test_with_entry() {
        let table = ManualTable::new().with_entry("Testby, Sverige", Coordinates::new(1.0, 2.0));
        assert_eq!(table.get("Testby, Sverige"), Some(Coordinates::new(1.0, 2.0)));
        assert!(!table.is_empty());
    }
}
