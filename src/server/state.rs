//! Server shared state
//!
//! Holds configuration and shared resources for the HTTP server.

use crate::auth::AdminGate;
use crate::config::Config;
use crate::service::ExchangeService;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Shared state for the HTTP server
pub struct AppState<B> {
    /// Configuration
    pub config: Config,

    /// Exchange data; one request at a time mutates it
    pub service: Mutex<ExchangeService<B>>,

    /// Held by every handler that may call the geocoder, so lookups stay
    /// paced across requests
    pub geocoding: Mutex<()>,

    /// Admin sessions
    pub admin: AdminGate,

    started_at: DateTime<Utc>,
}

impl<B> AppState<B> {
    /// Create new application state around an initialized service
    pub fn new(config: Config, service: ExchangeService<B>) -> Self {
        let admin = AdminGate::new(
            config.admin.password.clone(),
            config.admin.session_timeout_secs,
        );
        Self {
            config,
            service: Mutex::new(service),
            geocoding: Mutex::new(()),
            admin,
            started_at: Utc::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
