//! Exchange records
//!
//! The domain types owned by the record store: a stored exchange, the
//! editable fields used to create or update one, and the program category.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Exchange program category
///
/// Serialized by label. Unknown labels in stored data map to `Unknown`
/// instead of failing the whole load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Erasmus,
    Nordplus,
    Tca,
    Atlas,
    Unknown,
}

impl Category {
    /// Label used in the CSV file and in JSON
    pub fn label(&self) -> &'static str {
        match self {
            Self::Erasmus => "Erasmus",
            Self::Nordplus => "Nordplus",
            Self::Tca => "TCA",
            Self::Atlas => "Atlas",
            Self::Unknown => "Okänd",
        }
    }

    /// Parse a label from a data file, falling back to `Unknown`
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Self::Unknown)
    }

    /// The four named programs, in display order
    pub fn programs() -> [Category; 4] {
        [Self::Erasmus, Self::Nordplus, Self::Tca, Self::Atlas]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "erasmus" => Ok(Self::Erasmus),
            "nordplus" => Ok(Self::Nordplus),
            "tca" => Ok(Self::Tca),
            "atlas" => Ok(Self::Atlas),
            "okänd" | "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Unknown
    }
}

/// A stored exchange record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: u64,
    pub destination: String,
    pub activity: String,
    #[serde(default)]
    pub course: String,
    pub school: String,
    #[serde(default)]
    pub category: Category,
}

impl ExchangeRecord {
    /// Build a record from validated fields
    pub fn new(id: u64, fields: NewExchange) -> Self {
        Self {
            id,
            destination: fields.destination,
            activity: fields.activity,
            course: fields.course,
            school: fields.school,
            category: fields.category,
        }
    }

    /// Country part of the destination ("Porto, Portugal" -> "Portugal")
    pub fn country(&self) -> Option<&str> {
        self.destination
            .split(',')
            .nth(1)
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// True if any text field contains `needle` (already lowercased)
    pub fn matches_text(&self, needle: &str) -> bool {
        [&self.destination, &self.activity, &self.course, &self.school]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Editable fields of an exchange, as submitted by a form or an import row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExchange {
    pub destination: String,
    pub activity: String,
    #[serde(default)]
    pub course: String,
    pub school: String,
    #[serde(default)]
    pub category: Category,
}

impl NewExchange {
    /// Create a new exchange with the required fields
    pub fn new(
        destination: impl Into<String>,
        activity: impl Into<String>,
        school: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            destination: destination.into(),
            activity: activity.into(),
            course: String::new(),
            school: school.into(),
            category,
        }
    }

    /// Set the course or visiting school
    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = course.into();
        self
    }

    /// Trim every text field, requiring only a destination
    ///
    /// Imported rows go through this: a blank activity or school is kept
    /// as an empty string.
    pub fn normalized(self) -> Result<Self> {
        let fields = Self {
            destination: self.destination.trim().to_string(),
            activity: self.activity.trim().to_string(),
            course: self.course.trim().to_string(),
            school: self.school.trim().to_string(),
            category: self.category,
        };

        if fields.destination.is_empty() {
            return Err(Error::Validation(
                "missing required field(s): destination".to_string(),
            ));
        }
        Ok(fields)
    }

    /// Trim every text field and check the required ones
    ///
    /// Destination, activity and school must be non-blank. A failing record
    /// is rejected whole.
    pub fn validated(self) -> Result<Self> {
        let fields = Self {
            destination: self.destination.trim().to_string(),
            activity: self.activity.trim().to_string(),
            course: self.course.trim().to_string(),
            school: self.school.trim().to_string(),
            category: self.category,
        };

        let missing: Vec<&str> = [
            ("destination", &fields.destination),
            ("activity", &fields.activity),
            ("school", &fields.school),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(fields)
        } else {
            Err(Error::Validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::Tca.to_string(), "TCA");
        assert_eq!(Category::Unknown.to_string(), "Okänd");
        assert_eq!("tca".parse::<Category>().unwrap(), Category::Tca);
        assert_eq!("Okänd".parse::<Category>().unwrap(), Category::Unknown);
        assert!("Comenius".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_lenient_label() {
        assert_eq!(Category::from_label("Erasmus"), Category::Erasmus);
        assert_eq!(Category::from_label(" nordplus "), Category::Nordplus);
        assert_eq!(Category::from_label("Comenius"), Category::Unknown);
        assert_eq!(Category::from_label(""), Category::Unknown);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&Category::Atlas).unwrap();
        assert_eq!(json, r#""Atlas""#);

        let parsed: Category = serde_json::from_str(r#""Something else""#).unwrap();
        assert_eq!(parsed, Category::Unknown);
    }

    #[test]
    fn test_record_serialization() {
        let record = ExchangeRecord::new(
            7,
            NewExchange::new("Porto, Portugal", "Jobbskuggning", "Gymnasiet", Category::Erasmus)
                .with_course("Vård och omsorg"),
        );

        let json = serde_json::to_string(&record).unwrap();
        let parsed: ExchangeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert!(json.contains(r#""category":"Erasmus""#));
    }

    #[test]
    fn test_country() {
        let record = ExchangeRecord::new(
            1,
            NewExchange::new("Wien, Österrike", "Studiebesök", "Skola A", Category::Tca),
        );
        assert_eq!(record.country(), Some("Österrike"));

        let record = ExchangeRecord::new(
            2,
            NewExchange::new("Luxemburg", "Studiebesök", "Skola A", Category::Tca),
        );
        assert_eq!(record.country(), None);
    }

    #[test]
    fn test_matches_text() {
        let record = ExchangeRecord::new(
            1,
            NewExchange::new("Porto, Portugal", "Praktik", "Skola A", Category::Erasmus)
                .with_course("El och energi"),
        );
        assert!(record.matches_text("porto"));
        assert!(record.matches_text("energi"));
        assert!(!record.matches_text("wien"));
    }

    #[test]
    fn test_validated_trims_fields() {
        let fields = NewExchange::new("  Porto, Portugal ", " Praktik", "Skola A  ", Category::Erasmus)
            .validated()
            .unwrap();
        assert_eq!(fields.destination, "Porto, Portugal");
        assert_eq!(fields.activity, "Praktik");
        assert_eq!(fields.school, "Skola A");
    }

    #[test]
    fn test_validated_rejects_missing_fields() {
        let err = NewExchange::new("Porto, Portugal", "  ", "", Category::Erasmus)
            .validated()
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("activity"));
        assert!(message.contains("school"));
        assert!(!message.contains("destination"));
    }

    #[test]
    fn test_normalized_requires_only_destination() {
        let fields = NewExchange::new(" Bergen, Norge ", "  ", "", Category::Nordplus)
            .normalized()
            .unwrap();
        assert_eq!(fields.destination, "Bergen, Norge");
        assert_eq!(fields.activity, "");
        assert_eq!(fields.school, "");

        let err = NewExchange::new("   ", "Praktik", "Skola A", Category::Erasmus)
            .normalized()
            .unwrap_err();
        assert!(err.to_string().contains("destination"));
    }
}
