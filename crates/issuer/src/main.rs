//! `certseal-issuer` — HTTP service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP).
//! 3. Resolve the token key and build the [`TokenCodec`]. A missing or
//!    malformed key aborts startup.
//! 4. Create the output directories.
//! 5. Build the Axum router and serve until SIGINT/SIGTERM.

mod config;
mod issuance;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use codec::{EnvKeySource, TokenCodec};
use tracing::{error, info};

use config::Config;
use issuance::Storage;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        base_url = %cfg.base_url,
        "certseal issuer starting"
    );

    // -----------------------------------------------------------------------
    // 3. Token key
    // -----------------------------------------------------------------------
    let codec = TokenCodec::from_source(&EnvKeySource::default()).map_err(|e| {
        error!(error = %e, "token key unusable");
        e
    })?;
    info!(algorithm = %codec.algorithm(), "token key loaded");

    // -----------------------------------------------------------------------
    // 4. Output directories
    // -----------------------------------------------------------------------
    let storage = Storage::new(&cfg.output_dir, &cfg.qr_dir);
    storage
        .ensure_dirs()
        .await
        .context("failed to create output directories")?;

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(codec, storage, cfg.base_url.clone(), cfg.cert_id_prefix.clone());
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    telemetry::shutdown_telemetry();
    info!("certseal issuer stopped");
    Ok(())
}
