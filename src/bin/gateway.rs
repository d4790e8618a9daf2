//! HomeSec Dashboard Gateway
//!
//! Run with: cargo run --bin homesec-gateway -- [--config path/to/config.toml]
//!
//! # Configuration
//!
//! Config file sections `[gateway]`, `[upstream]`, `[poller]`, `[auth]`,
//! `[logging]`; see `homesec-cli config` for a commented default.
//!
//! Environment variables:
//! - `HOMESEC_GATEWAY_HOST`: Host to bind to (default: 0.0.0.0)
//! - `HOMESEC_GATEWAY_PORT`: Port to listen on (default: 5000)
//! - `HOMESEC_UPSTREAM_URL`: Remote API base URL
//! - `HOMESEC_POLL_INTERVAL_MS`: Status poll interval (default: 3000)
//! - `HOMESEC_LOG_LEVEL`, `HOMESEC_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely

use clap::Parser;
use homesec::api::{serve, AppState};
use homesec::config::Config;
use homesec::poller::StatusPoller;
use homesec::upstream::HomeSecClient;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "homesec-gateway")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dashboard gateway in front of the home-security API")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::resolve(args.config.as_deref())?;

    homesec::logging::init(&config.logging);

    tracing::info!("Starting HomeSec gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Remote API: {}", config.upstream.url);
    tracing::info!("Static directory: {}", config.gateway.static_dir);

    let client = Arc::new(HomeSecClient::new(config.upstream.client_config())?);
    tracing::debug!(
        timeout_ms = client.config().request_timeout_ms,
        "Remote API client ready"
    );
    let mut state = AppState::new(Arc::clone(&client), &config);

    if config.auth.dev_user.is_some() {
        tracing::warn!("Development test user enabled; do not use in production");
    }

    // Start background status polling if enabled
    let poller = if config.poller.enabled {
        let poller = Arc::new(StatusPoller::new(client, config.poller.interval()));
        Arc::clone(&poller).start();
        state = state.with_poller(Arc::clone(&poller));
        Some(poller)
    } else {
        tracing::info!("Status polling disabled");
        None
    };

    // Run server
    serve(state, &config.gateway).await?;

    // Graceful shutdown
    if let Some(poller) = poller {
        tracing::info!("Stopping status poller...");
        poller.stop().await;
    }
    tracing::info!("HomeSec gateway stopped");

    Ok(())
}
