//! Error types for key resolution and token coding.

use thiserror::Error;

/// Errors raised while resolving the token key.
///
/// Both variants are configuration errors: a process that hits one cannot
/// issue or verify anything and should refuse to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The key source yielded nothing, or only whitespace.
    #[error("{source_name} is not set")]
    Missing {
        /// Human-readable name of the key source (e.g. the env var).
        source_name: String,
    },

    /// The key text could not be decoded, or decoded to an unusable length.
    ///
    /// `reason` never contains any part of the key itself.
    #[error("invalid {source_name} format ({reason}); use 64-char hex or base64")]
    InvalidFormat {
        /// Human-readable name of the key source.
        source_name: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Errors produced by [`TokenCodec`](crate::TokenCodec).
///
/// Callers that face end users must not surface the variant: see
/// [`TokenCodec::verify`](crate::TokenCodec::verify).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The token is not URL-safe base64, or is too short to hold a nonce and tag.
    #[error("malformed token: {0}")]
    BadEncoding(String),

    /// AEAD tag verification failed: wrong key or altered bytes.
    #[error("token failed authentication")]
    Forged,

    /// The token authenticated but its payload is not a record.
    #[error("token payload is corrupt: {0}")]
    Corrupt(String),

    /// The record could not be serialised.
    #[error("record serialisation failed: {0}")]
    Serialize(String),

    /// AES-GCM sealing failed. Unreachable for records of sane size.
    #[error("aead seal failed")]
    Encrypt,
}

impl CodecError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::BadEncoding(_) => "bad_encoding",
            CodecError::Forged => "forged",
            CodecError::Corrupt(_) => "corrupt",
            CodecError::Serialize(_) => "serialize",
            CodecError::Encrypt => "encrypt",
        }
    }
}
