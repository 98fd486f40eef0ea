//! Command-line arguments for `certctl`.

use clap::{Parser, Subcommand, ValueEnum};
use codec::{Algorithm, DEFAULT_KEY_VAR};

/// Generate token keys and encode or decode certificate tokens.
#[derive(Parser, Debug, Clone)]
#[command(name = "certctl", version)]
pub struct Cli {
    /// Environment variable holding the token key.
    #[arg(long, global = true, default_value = DEFAULT_KEY_VAR)]
    pub key_env: String,

    /// Tracing log level for stderr diagnostics.
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print a fresh random key.
    Keygen {
        /// Key size in bytes: 16, 24 or 32.
        #[arg(long, default_value_t = 32, value_parser = parse_key_len)]
        bytes: usize,

        /// Text encoding of the key. Hex is only accepted for 32-byte keys.
        #[arg(long, value_enum, default_value_t = KeyFormat::Base64)]
        format: KeyFormat,
    },

    /// Seal a certificate record and print its token.
    Encode {
        /// Recipient's full name.
        #[arg(long)]
        name: String,

        /// Certificate identifier, e.g. SKY-2024-0001.
        #[arg(long)]
        cert_id: String,

        /// Issue date; defaults to today (local time, YYYY-MM-DD).
        #[arg(long)]
        issued_at: Option<String>,

        /// Extra `key=value` fields appended after the standard three.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Verify a token and print its record as JSON.
    Decode {
        /// Token as issued; surrounding whitespace is ignored.
        token: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    Hex,
    Base64,
}

fn parse_key_len(s: &str) -> Result<usize, String> {
    let len: usize = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    Algorithm::for_key_len(len)
        .map(|_| len)
        .ok_or_else(|| "key size must be 16, 24 or 32 bytes".to_string())
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_owned(), v.to_owned())),
        _ => Err(format!("expected key=value, got `{s}`")),
    }
}
