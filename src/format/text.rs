//! Human-readable text output formatter

use crate::aggregate::MapMarker;
use crate::error::Result;
use crate::format::MarkerFormatter;

/// Text formatter - one block per marker with its exchanges
pub struct TextFormatter;

impl MarkerFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, markers: &[MapMarker]) -> Result<String> {
        if markers.is_empty() {
            return Ok("No located exchanges.\n".to_string());
        }

        let mut output = String::new();
        for marker in markers {
            output.push_str(&format!("{} {}\n", marker.summary(), marker.coords));
            for record in &marker.records {
                output.push_str(&format!("  [{}] {}", record.category, record.activity));
                if !record.course.is_empty() {
                    output.push_str(&format!(" - {}", record.course));
                }
                output.push_str(&format!(" ({})\n", record.school));
            }
        }

        let total: usize = markers.iter().map(|m| m.records.len()).sum();
        output.push_str(&format!("\n{} destinations, {} exchanges\n", markers.len(), total));

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_markers;

    #[test]
    fn test_text_format() {
        let output = TextFormatter.format(&sample_markers()).unwrap();

        assert!(output.contains("Porto, Portugal (2 utbyten) (41.1579, -8.6291)"));
        assert!(output.contains("  [Erasmus] Praktik - Vård & omsorg (Gymnasiet)"));
        assert!(output.contains("  [Nordplus] Studiebesök (Gymnasiet)"));
        assert!(output.contains("Wien, Österrike (1 utbyte)"));
        assert!(output.contains("2 destinations, 3 exchanges"));
    }

    #[test]
    fn test_text_empty() {
        assert_eq!(TextFormatter.format(&[]).unwrap(), "No located exchanges.\n");
    }
}
