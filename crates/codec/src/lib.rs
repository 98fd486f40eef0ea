//! Authenticated, URL-safe certificate tokens.
//!
//! This crate is intentionally free of HTTP and filesystem dependencies. It
//! resolves the symmetric key, seals a [`Record`] with AES-GCM and frames the
//! result so it can sit in a URL path segment.
//!
//! # Token format
//!
//! ```text
//! base64url-no-pad( nonce[12] || ciphertext || tag[16] )
//! ```
//!
//! The key length picks the cipher: 16, 24 or 32 bytes select AES-128-GCM,
//! AES-192-GCM or AES-256-GCM respectively.

pub mod error;
pub mod key;
pub mod record;
pub mod token;

pub use error::{CodecError, KeyError};
pub use key::{Algorithm, EnvKeySource, KeySource, StaticKeySource, TokenKey, DEFAULT_KEY_VAR};
pub use record::Record;
pub use token::{TokenCodec, Verdict, MIN_TOKEN_LEN, NONCE_LEN, TAG_LEN};
