//! Geographic coordinates
//!
//! Coordinates are derived data: every value here can be rebuilt from a
//! destination string through the resolver.

use crate::constants::geo::{SENTINEL_LAT, SENTINEL_LNG};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The fallback returned when a destination cannot be located
    pub const fn sentinel() -> Self {
        Self {
            lat: SENTINEL_LAT,
            lng: SENTINEL_LNG,
        }
    }

    /// True if these coordinates are exactly the sentinel value
    ///
    /// Equality is exact on purpose: the sentinel is a marker, not a place.
    pub fn is_sentinel(&self) -> bool {
        self.lat == SENTINEL_LAT && self.lng == SENTINEL_LNG
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::Geo(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::Geo(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        let sentinel = Coordinates::sentinel();
        assert_eq!(sentinel, Coordinates::new(50.0, 10.0));
        assert!(sentinel.is_sentinel());
        assert!(!Coordinates::new(50.0, 10.0001).is_sentinel());
    }

    #[test]
    fn test_validate() {
        assert!(Coordinates::new(41.1579, -8.6291).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -181.0).validate().is_err());
    }

    #[test]
    fn test_display() {
        let coords = Coordinates::new(48.2082, 16.3738);
        assert_eq!(coords.to_string(), "(48.2082, 16.3738)");
    }

    #[test]
    fn test_serialization() {
        let coords = Coordinates::new(59.3293, 18.0686);
        let json = serde_json::to_string(&coords).unwrap();
        assert_eq!(json, r#"{"lat":59.3293,"lng":18.0686}"#);

        let parsed: Coordinates = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, coords);
    }
}
