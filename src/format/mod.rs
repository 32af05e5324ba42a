//! Output formatters
//!
//! Provides trait-based output formatting for map markers.

pub mod geojson;
pub mod gpx;
pub mod json;
pub mod text;

use crate::aggregate::MapMarker;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait MarkerFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Render the markers
    fn format(&self, markers: &[MapMarker]) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn MarkerFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "geojson" => Some(Box::new(geojson::GeoJsonFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    ["json", "geojson", "gpx", "text"]
        .iter()
        .filter_map(|name| get_formatter(name))
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_markers() -> Vec<MapMarker> {
    use crate::coord::Coordinates;
    use crate::exchange::{Category, ExchangeRecord, NewExchange};

    vec![
        MapMarker {
            destination: "Porto, Portugal".to_string(),
            coords: Coordinates::new(41.1579, -8.6291),
            category: Category::Erasmus,
            records: vec![
                ExchangeRecord::new(
                    1,
                    NewExchange::new("Porto, Portugal", "Praktik", "Gymnasiet", Category::Erasmus)
                        .with_course("Vård & omsorg"),
                ),
                ExchangeRecord::new(
                    2,
                    NewExchange::new("Porto, Portugal", "Studiebesök", "Gymnasiet", Category::Nordplus),
                ),
            ],
        },
        MapMarker {
            destination: "Wien, Österrike".to_string(),
            coords: Coordinates::new(48.2082, 16.3738),
            category: Category::Tca,
            records: vec![ExchangeRecord::new(
                3,
                NewExchange::new("Wien, Österrike", "Praktik", "Grundskolan", Category::Tca),
            )],
        },
    ]
}
