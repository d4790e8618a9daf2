//! Application State
//!
//! Shared state accessible by all gateway handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, DevUserConfig};
use crate::poller::StatusPoller;
use crate::session::SessionStore;
use crate::upstream::HomeSecClient;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Client for the remote home-security API
    pub client: Arc<HomeSecClient>,
    /// Signed-in markers keyed by session cookie
    pub sessions: SessionStore,
    /// Background status poller (optional)
    pub poller: Option<Arc<StatusPoller>>,
    /// Directory holding page shells and assets
    pub static_dir: PathBuf,
    /// Development-only test account
    pub dev_user: Option<DevUserConfig>,
    /// Allowed CORS origins (empty = permissive)
    pub cors_origins: Vec<String>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState without a status poller
    pub fn new(client: Arc<HomeSecClient>, config: &Config) -> Self {
        Self {
            client,
            sessions: SessionStore::with_ttl(config.session.ttl()),
            poller: None,
            static_dir: PathBuf::from(&config.gateway.static_dir),
            dev_user: config.auth.dev_user.clone(),
            cors_origins: config.gateway.cors_origins.clone(),
            start_time: Instant::now(),
        }
    }

    /// Attach a status poller
    pub fn with_poller(mut self, poller: Arc<StatusPoller>) -> Self {
        self.poller = Some(poller);
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
