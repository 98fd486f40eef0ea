//! Configuration loading and validation for the issuer service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.
//! The token key itself is not part of this struct: it is resolved by
//! [`codec::TokenKey::resolve`] from `ENCRYPTION_KEY` so it never lands in a
//! `Debug` dump.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated issuer service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Public origin prefixed to `/verify/<token>` in issued URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory token logs are written to and downloaded from.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory scannable-code images are written to and downloaded from.
    #[serde(default = "default_qr_dir")]
    pub qr_dir: String,

    /// Prefix of generated certificate IDs (`<PREFIX>-<year>-<index>`).
    #[serde(default = "default_cert_id_prefix")]
    pub cert_id_prefix: String,

    /// OTLP collector endpoint. Spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    5000
}
fn default_base_url() -> String {
    "http://localhost:5000".into()
}
fn default_output_dir() -> String {
    "static/downloads".into()
}
fn default_qr_dir() -> String {
    "static/qrcodes".into()
}
fn default_cert_id_prefix() -> String {
    "SKY".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            base_url: default_base_url(),
            output_dir: default_output_dir(),
            qr_dir: default_qr_dir(),
            cert_id_prefix: default_cert_id_prefix(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let mut c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.normalise();
        c.validate()?;
        Ok(c)
    }

    /// Strip a trailing `/` from the base URL and drop a blank OTLP endpoint.
    fn normalise(&mut self) {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_owned();
        self.base_url = trimmed;
        if self
            .otel_exporter_otlp_endpoint
            .as_deref()
            .is_some_and(|e| e.trim().is_empty())
        {
            self.otel_exporter_otlp_endpoint = None;
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.base_url, "BASE_URL")?;
        ensure_non_empty(&self.output_dir, "OUTPUT_DIR")?;
        ensure_non_empty(&self.qr_dir, "QR_DIR")?;
        ensure_non_empty(&self.cert_id_prefix, "CERT_ID_PREFIX")?;

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!("BASE_URL must start with http:// or https://");
        }
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if !self
            .cert_id_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!("CERT_ID_PREFIX may only contain ASCII letters, digits, '-' and '_'");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
