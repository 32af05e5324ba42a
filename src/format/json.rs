//! JSON output formatter

use crate::aggregate::MapMarker;
use crate::error::Result;
use crate::format::MarkerFormatter;

/// JSON formatter - outputs the marker list as pretty-printed JSON
pub struct JsonFormatter;

impl MarkerFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Marker list as JSON"
    }

    fn format(&self, markers: &[MapMarker]) -> Result<String> {
        Ok(serde_json::to_string_pretty(markers)?)
    }
}
