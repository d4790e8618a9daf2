//! Session Marker
//!
//! The email/device pair recorded after a successful login. It only gates
//! navigation (login vs. dashboard) and is never sent as a credential.
//!
//! - [`SessionFile`] keeps the CLI's marker on disk between invocations.
//! - [`SessionStore`] keeps the gateway's markers in memory, keyed by the
//!   random id carried in the session cookie.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Who is signed in on this client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub email: String,
    pub device_id: String,
    pub created_at: DateTime<Utc>,
}

impl SessionMarker {
    pub fn new(email: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            device_id: device_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Corrupt session file {path:?}: {error}")]
    Corrupt { path: PathBuf, error: String },
}

/// Marker persisted as JSON in a per-user file
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the marker, `None` when nobody is signed in
    pub fn load(&self) -> Result<Option<SessionMarker>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SessionError::Corrupt {
                path: self.path.clone(),
                error: e.to_string(),
            })
    }

    pub fn save(&self, marker: &SessionMarker) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = serde_json::to_string_pretty(marker).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    /// Remove the marker. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, e: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        }
    }
}

/// How long a gateway session lives unless configured otherwise
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// In-memory markers for the gateway, keyed by session id.
///
/// A marker older than the store's TTL is treated as absent. Expired
/// entries are dropped when looked up and swept whenever a session is
/// created.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionMarker>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, marker: &SessionMarker, now: DateTime<Utc>) -> bool {
        // A marker dated in the future is not expired
        (now - marker.created_at)
            .to_std()
            .map(|age| age >= self.ttl)
            .unwrap_or(false)
    }

    /// Store a marker under a fresh random id and return the id
    pub async fn create(&self, marker: SessionMarker) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, existing| !self.is_expired(existing, now));
        sessions.insert(id.clone(), marker);
        id
    }

    pub async fn get(&self, id: &str) -> Option<SessionMarker> {
        let marker = self.sessions.read().await.get(id).cloned()?;
        if self.is_expired(&marker, Utc::now()) {
            self.sessions.write().await.remove(id);
            return None;
        }
        Some(marker)
    }

    pub async fn remove(&self, id: &str) -> Option<SessionMarker> {
        self.sessions.write().await.remove(id)
    }

    /// Drop every expired marker, returning how many went
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, marker| !self.is_expired(marker, now));
        before - sessions.len()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|marker| !self.is_expired(marker, now))
            .count()
    }
}
