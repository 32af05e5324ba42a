//! Centralized constants for the exchange-map crate
//!
//! Values shared between the resolver, the store and the HTTP layer.

/// Geographic constants
pub mod geo {
    /// Latitude of the "no location resolved" sentinel (center of Europe)
    pub const SENTINEL_LAT: f64 = 50.0;

    /// Longitude of the "no location resolved" sentinel
    pub const SENTINEL_LNG: f64 = 10.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Identifying header sent with every geocoding request
    pub const USER_AGENT: &str = "InternationalExchangeMap/1.0";

    /// Minimum pause after a request to the geocoder, in milliseconds.
    /// Nominatim's usage policy allows at most one request per second.
    pub const GEOCODE_INTERVAL_MS: u64 = 1000;
}

/// Logical keys in the persisted key-value store
pub mod storage {
    pub const EXCHANGES_KEY: &str = "exchanges";
    pub const COORDINATES_KEY: &str = "coordinates";

    /// Store file name inside the data directory
    pub const STORE_FILE_NAME: &str = "store.json";
}

/// CSV column headers of the exchange file
pub mod csv {
    pub const DESTINATION: &str = "Destination";
    pub const ACTIVITY: &str = "Aktivitet";
    pub const COURSE: &str = "Kurs/besökande skola";
    pub const SCHOOL: &str = "Enhet";
    /// The category column has no header text
    pub const CATEGORY: &str = "";

    pub const DELIMITER: u8 = b';';
}
