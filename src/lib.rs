//! exchange-map: International Exchange Map
//!
//! A library and CLI tool that places a school's international exchanges on
//! a map. Destinations are resolved to coordinates through a curated table,
//! a cache and a rate-limited geocoder, then grouped into one marker per
//! place.
//!
//! ## Features
//!
//! - Manual table, cache and Nominatim geocoder with one request per second
//! - Exchange records with category, activity, school and text filters
//! - `;`-delimited CSV import and export
//! - JSON/GeoJSON/GPX/text marker output
//! - HTTP API with a password-gated admin panel + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use exchange_map::aggregate::{build_markers, group_by_destination};
//! use exchange_map::exchange::{Category, NewExchange};
//! use exchange_map::geo::CoordinateCache;
//! use exchange_map::store::{ExchangeStore, FilterState};
//! use exchange_map::Coordinates;
//! use std::sync::Arc;
//!
//! let mut store = ExchangeStore::new(Arc::new(CoordinateCache::new()));
//! store
//!     .add(NewExchange::new("Porto, Portugal", "Praktik", "Gymnasiet", Category::Erasmus))
//!     .unwrap();
//! store.set_coordinate("Porto, Portugal", Coordinates::new(41.1579, -8.6291));
//!
//! let groups = group_by_destination(store.filter(&FilterState::default()));
//! let markers = build_markers(groups, store.coordinates());
//! println!("{}", markers[0].summary()); // Porto, Portugal (1 utbyte)
//! ```

pub mod aggregate;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod exchange;
pub mod format;
pub mod geo;
pub mod server;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use aggregate::MapMarker;
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use exchange::{Category, ExchangeRecord, NewExchange};
pub use service::ExchangeService;
pub use store::{ExchangeStore, FilterState};
