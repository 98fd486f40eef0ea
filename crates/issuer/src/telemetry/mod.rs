//! Tracing setup: structured JSON logs, plus optional OTLP span export.
//!
//! # Telemetry invariants
//!
//! - **No key material and no token plaintext** in any span attribute or log
//!   field. Tokens themselves are logged only by length.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden by
//!   `RUST_LOG` when set.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
