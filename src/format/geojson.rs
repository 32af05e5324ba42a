//! GeoJSON output formatter
//!
//! One `Point` feature per marker. GeoJSON positions are `[lng, lat]`.

use crate::aggregate::MapMarker;
use crate::error::Result;
use crate::format::MarkerFormatter;
use serde_json::{json, Value};

/// GeoJSON formatter - outputs a FeatureCollection
pub struct GeoJsonFormatter;

fn feature(marker: &MapMarker) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [marker.coords.lng, marker.coords.lat],
        },
        "properties": {
            "destination": marker.destination,
            "category": marker.category,
            "summary": marker.summary(),
            "count": marker.records.len(),
            "exchanges": marker.records,
        },
    })
}

impl MarkerFormatter for GeoJsonFormatter {
    fn name(&self) -> &str {
        "geojson"
    }

    fn description(&self) -> &str {
        "GeoJSON FeatureCollection"
    }

    fn format(&self, markers: &[MapMarker]) -> Result<String> {
        let collection = json!({
            "type": "FeatureCollection",
            "features": markers.iter().map(feature).collect::<Vec<_>>(),
        });
        Ok(serde_json::to_string_pretty(&collection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_markers;
    use approx::assert_relative_eq;

    #[test]
    fn test_geojson_format() {
        let output = GeoJsonFormatter.format(&sample_markers()).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["type"], "FeatureCollection");
        let features = parsed["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let porto = &features[0];
        assert_eq!(porto["geometry"]["type"], "Point");
        assert_relative_eq!(porto["geometry"]["coordinates"][0].as_f64().unwrap(), -8.6291);
        assert_relative_eq!(porto["geometry"]["coordinates"][1].as_f64().unwrap(), 41.1579);
        assert_eq!(porto["properties"]["summary"], "Porto, Portugal (2 utbyten)");
        assert_eq!(porto["properties"]["count"], 2);
    }

    #[test]
    fn test_geojson_empty() {
        let output = GeoJsonFormatter.format(&[]).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert!(parsed["features"].as_array().unwrap().is_empty());
    }
}
