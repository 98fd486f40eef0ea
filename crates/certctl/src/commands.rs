//! Subcommand implementations.
//!
//! Each command writes its result to `out` so it can be exercised in tests
//! without capturing the process's stdout.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Local;
use codec::{Algorithm, EnvKeySource, Record, TokenCodec, TokenKey, Verdict};
use common::protocol::INVALID_TOKEN_MESSAGE;
use tracing::info;

use crate::config::{Cli, Command, KeyFormat};

/// Process exit status reported by [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// `decode` was given a token that did not verify.
    Rejected,
}

/// Dispatch the parsed command line.
///
/// # Errors
///
/// Returns an error if the key is missing or malformed, or output cannot be
/// written. An invalid token is not an error: it yields [`Outcome::Rejected`].
pub fn run(cli: Cli, out: &mut impl Write) -> Result<Outcome> {
    match cli.command {
        Command::Keygen { bytes, format } => {
            keygen(bytes, format, out)?;
            Ok(Outcome::Success)
        }
        Command::Encode {
            name,
            cert_id,
            issued_at,
            fields,
        } => {
            let codec = codec_from_env(&cli.key_env)?;
            let issued_at = issued_at.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            let mut record = Record::certificate(name, cert_id, issued_at);
            for (k, v) in fields {
                record.insert(k, v);
            }
            encode(&codec, &record, out)?;
            Ok(Outcome::Success)
        }
        Command::Decode { token } => {
            let codec = codec_from_env(&cli.key_env)?;
            decode(&codec, &token, out)
        }
    }
}

fn codec_from_env(var: &str) -> Result<TokenCodec> {
    let codec = TokenCodec::from_source(&EnvKeySource::new(var))?;
    info!(algorithm = %codec.algorithm(), "token key loaded");
    Ok(codec)
}

fn keygen(bytes: usize, format: KeyFormat, out: &mut impl Write) -> Result<()> {
    let algorithm = Algorithm::for_key_len(bytes)
        .with_context(|| format!("unsupported key size: {bytes} bytes"))?;
    if format == KeyFormat::Hex && algorithm != Algorithm::Aes256Gcm {
        anyhow::bail!("hex keys must be 32 bytes; use --format base64 for {bytes}-byte keys");
    }
    let key = TokenKey::generate(algorithm);
    let text = match format {
        KeyFormat::Hex => key.to_hex(),
        KeyFormat::Base64 => key.to_base64(),
    };
    writeln!(out, "{text}")?;
    Ok(())
}

fn encode(codec: &TokenCodec, record: &Record, out: &mut impl Write) -> Result<()> {
    let token = codec.encode(record).context("failed to seal record")?;
    writeln!(out, "{token}")?;
    Ok(())
}

fn decode(codec: &TokenCodec, token: &str, out: &mut impl Write) -> Result<Outcome> {
    match codec.verify(token.trim()) {
        Verdict::Valid(record) => {
            serde_json::to_writer_pretty(&mut *out, &record)?;
            writeln!(out)?;
            Ok(Outcome::Success)
        }
        Verdict::Invalid => {
            eprintln!("{INVALID_TOKEN_MESSAGE}");
            Ok(Outcome::Rejected)
        }
    }
}
