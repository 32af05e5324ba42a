//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::api;

/// Default geocoder endpoint
pub const DEFAULT_GEOCODER_ENDPOINT: &str = api::NOMINATIM_URL;

/// Default User-Agent sent to the geocoder
pub const DEFAULT_USER_AGENT: &str = api::USER_AGENT;

/// Default pause after each geocoder request, in milliseconds
pub const DEFAULT_GEOCODE_INTERVAL_MS: u64 = api::GEOCODE_INTERVAL_MS;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default exchange file, read when nothing has been persisted yet
pub const DEFAULT_CSV_PATH: &str = "Utbyten.csv";

/// Default directory of the browser front-end
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Default shared admin password
pub const DEFAULT_ADMIN_PASSWORD: &str = "Vanessagillargodis";

/// Default admin session lifetime in seconds (2 hours)
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 2 * 60 * 60;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "exchange-map";
