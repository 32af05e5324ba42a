//! GPX output formatter

use crate::aggregate::MapMarker;
use crate::error::Result;
use crate::exchange::Category;
use crate::format::MarkerFormatter;

/// GPX formatter - outputs GPX waypoint file
pub struct GpxFormatter;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl MarkerFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoint file"
    }

    fn format(&self, markers: &[MapMarker]) -> Result<String> {
        let mut gpx = String::new();

        // XML header
        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="exchange-map">"#);
        gpx.push('\n');

        gpx.push_str("  <metadata>\n");
        gpx.push_str("    <name>International exchanges</name>\n");
        gpx.push_str(&format!("    <time>{}</time>\n", chrono::Utc::now().to_rfc3339()));
        gpx.push_str("  </metadata>\n");

        for marker in markers {
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                marker.coords.lat, marker.coords.lng
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape(&marker.destination)));

            let activities: Vec<String> = marker
                .records
                .iter()
                .map(|r| format!("{} ({}, {})", r.activity, r.school, r.category))
                .collect();
            gpx.push_str(&format!(
                "    <desc>{}</desc>\n",
                escape(&activities.join("; "))
            ));

            let symbol = match marker.category {
                Category::Erasmus => "flag, blue",
                Category::Nordplus => "flag, green",
                Category::Tca => "flag, red",
                Category::Atlas => "flag, yellow",
                Category::Unknown => "waypoint",
            };
            gpx.push_str(&format!("    <sym>{}</sym>\n", symbol));
            gpx.push_str(&format!("    <type>{}</type>\n", marker.category));

            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}
