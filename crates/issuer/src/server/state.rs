//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use codec::TokenCodec;

use crate::issuance::{Issuer, Storage};

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying key schedules.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Token codec built from the startup key; read-only.
    pub codec: Arc<TokenCodec>,
    /// Batch issuer sharing the same codec.
    pub issuer: Arc<Issuer>,
    /// Output directories served by the download routes.
    pub storage: Storage,
}

impl AppState {
    /// Create a new [`AppState`] around a resolved codec.
    pub fn new(
        codec: TokenCodec,
        storage: Storage,
        base_url: impl Into<String>,
        cert_id_prefix: impl Into<String>,
    ) -> Self {
        let codec = Arc::new(codec);
        let issuer = Issuer::new(codec.clone(), storage.clone(), base_url, cert_id_prefix);
        Self {
            codec,
            issuer: Arc::new(issuer),
            storage,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State with a fixed AES-256 key and output under `root`, for tests.
    pub fn for_tests(root: &std::path::Path) -> Self {
        let key = codec::TokenKey::from_bytes(vec![0x5au8; 32]).unwrap();
        Self::new(
            TokenCodec::new(&key),
            Storage::new(root.join("downloads"), root.join("qrcodes")),
            "http://localhost:5000",
            "SKY",
        )
    }
}
