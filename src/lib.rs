//! # HomeSec
//!
//! Client side of a home-security dashboard: validates login and
//! registration forms before anything reaches the network, submits them to
//! the remote API, and keeps a rendered view of the device status panel
//! fresh by polling.
//!
//! ## Modules
//!
//! - [`validation`]: Field validators and per-field error collection
//! - [`auth`]: Login, registration, profile and password flows
//! - [`status`]: Device snapshot, panel rendering and the alert feed
//! - [`poller`]: Periodic status polling
//! - [`upstream`]: HTTP client for the remote API
//! - [`session`]: Signed-in markers for the CLI and the gateway
//! - [`api`]: Dashboard gateway with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use homesec::auth::{submit_login, LoginForm};
//! use homesec::upstream::{HomeSecClient, UpstreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HomeSecClient::new(UpstreamConfig::default())?;
//!
//!     let form = LoginForm::new("jane@example.com", "12345678", "42");
//!     match submit_login(&client, form).await {
//!         Ok(outcome) => println!("Signed in as {}", outcome.marker.email),
//!         Err(e) => eprintln!("{}", e),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod poller;
pub mod session;
pub mod status;
pub mod upstream;
pub mod validation;

// Re-export top-level types for convenience
pub use validation::{Field, FieldErrors};

pub use auth::{submit_login, submit_register, LoginForm, RegisterForm, SubmitError};

pub use status::{render, AlertFeed, DeviceStatusSnapshot, Panel};

pub use poller::{PollOutcome, PollState, StatusPoller};

pub use upstream::{HomeSecClient, UpstreamError};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError};
