//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::upstream::UpstreamConfig as ClientConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the page shells and `/static` assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            cors_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_upstream_url() -> String {
    "https://homesecurity-cw0e.onrender.com".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl UpstreamConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.url.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Status poller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    /// Run the poller inside the gateway
    #[serde(default = "default_poller_enabled")]
    pub enabled: bool,
}

fn default_poll_interval() -> u64 {
    3000 // 3 seconds
}

fn default_poller_enabled() -> bool {
    true
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            enabled: default_poller_enabled(),
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(100))
    }
}

/// Gateway-side authentication settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Local test account answered by the gateway without calling upstream
    pub dev_user: Option<DevUserConfig>,
}

/// Development-only test account
#[derive(Debug, Clone, Deserialize)]
pub struct DevUserConfig {
    pub email: String,
    pub password: String,
    #[serde(default = "default_dev_name")]
    pub name: String,
}

fn default_dev_name() -> String {
    "Admin Tester".to_string()
}

/// Session settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Where the CLI keeps its marker
    #[serde(default = "default_session_file")]
    pub file: String,

    /// Lifetime of a gateway session cookie, in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

fn default_session_ttl() -> u64 {
    12 * 60 * 60
}

fn default_session_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("homesec").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./homesec_session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
            ttl_secs: default_session_ttl(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.max(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load an explicit file, or fall back to the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("homesec").join("config.toml")),
            Some(PathBuf::from("/etc/homesec/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Gateway overrides
        if let Some(host) = lookup("HOMESEC_GATEWAY_HOST") {
            self.gateway.host = host;
        }
        if let Some(port) = lookup("HOMESEC_GATEWAY_PORT") {
            if let Ok(p) = port.parse() {
                self.gateway.port = p;
            }
        }

        if let Some(url) = lookup("HOMESEC_UPSTREAM_URL") {
            self.upstream.url = url;
        }

        if let Some(interval) = lookup("HOMESEC_POLL_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                self.poller.interval_ms = ms;
            }
        }

        if let Some(file) = lookup("HOMESEC_SESSION_FILE") {
            self.session.file = file;
        }

        // Logging overrides
        if let Some(level) = lookup("HOMESEC_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("HOMESEC_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# HomeSec Configuration
#
# Environment variables override these settings:
# - HOMESEC_GATEWAY_HOST
# - HOMESEC_GATEWAY_PORT
# - HOMESEC_UPSTREAM_URL
# - HOMESEC_POLL_INTERVAL_MS
# - HOMESEC_SESSION_FILE
# - HOMESEC_LOG_LEVEL
# - HOMESEC_LOG_FORMAT

[gateway]
# Gateway host and port
host = "0.0.0.0"
port = 5000

# Directory with login.html, register.html, dashboard.html and assets
static_dir = "static"

# Allowed CORS origins (empty = permissive)
cors_origins = []

[upstream]
# Home security backend
url = "https://homesecurity-cw0e.onrender.com"

# Request timeout in milliseconds
request_timeout_ms = 10000

[poller]
# How often to fetch device status (ms)
interval_ms = 3000

# Run the status poller inside the gateway
enabled = true

# Development-only account answered by the gateway itself
# [auth.dev_user]
# email = "admin@test.com"
# password = "admin123"
# name = "Admin Tester"

[session]
# Where the CLI keeps the signed-in marker
# file = "~/.local/share/homesec/session.json"

# Lifetime of a gateway session, in seconds
ttl_secs = 43200

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
