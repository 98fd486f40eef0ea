//! AES-GCM sealing of records into URL-safe tokens.
//!
//! **Nonces are random, never counters or constants.** GCM nonce reuse under
//! one key breaks both confidentiality and authentication, so every
//! [`TokenCodec::encode`] call draws 96 fresh bits from the OS CSPRNG.

use std::fmt;

use aes_gcm::{
    aead::{consts::U12, rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use aes::Aes192;
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use tracing::debug;

use crate::error::{CodecError, KeyError};
use crate::key::{Algorithm, KeySource, TokenKey};
use crate::record::Record;

/// Byte length of the AES-GCM nonce prefix (96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the AES-GCM authentication tag suffix.
pub const TAG_LEN: usize = 16;

/// Smallest decoded token that can possibly authenticate.
pub const MIN_TOKEN_LEN: usize = NONCE_LEN + TAG_LEN;

/// URL-safe alphabet; emits no padding, accepts tokens with or without it.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

type Aes192Gcm = AesGcm<Aes192, U12>;

#[derive(Clone)]
enum Cipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl Cipher {
    fn new(key: &TokenKey) -> Self {
        let bytes = key.as_bytes();
        // Lengths are checked when the TokenKey is built, so these cannot fail.
        match key.algorithm() {
            Algorithm::Aes128Gcm => Cipher::Aes128(Aes128Gcm::new(bytes.into())),
            Algorithm::Aes192Gcm => Cipher::Aes192(Aes192Gcm::new(bytes.into())),
            Algorithm::Aes256Gcm => Cipher::Aes256(Aes256Gcm::new(bytes.into())),
        }
    }

    fn seal(&self, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        match self {
            Cipher::Aes128(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes192(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes256(c) => c.encrypt(nonce, plaintext),
        }
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        match self {
            Cipher::Aes128(c) => c.decrypt(nonce, ciphertext),
            Cipher::Aes192(c) => c.decrypt(nonce, ciphertext),
            Cipher::Aes256(c) => c.decrypt(nonce, ciphertext),
        }
    }
}

/// Outcome of [`TokenCodec::verify`]: the only two states a user may see.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The token authenticated; here is its record.
    Valid(Record),
    /// The token is malformed, forged, or corrupt. Which one is not disclosed.
    Invalid,
}

/// Encodes records into tokens and decodes them back.
///
/// Built once from a resolved key and immutable afterwards; cheap to clone
/// and safe to share across threads.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: Cipher,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Build a codec around an already resolved key.
    pub fn new(key: &TokenKey) -> Self {
        Self {
            cipher: Cipher::new(key),
            algorithm: key.algorithm(),
        }
    }

    /// Resolve the key from `source` and build a codec around it.
    ///
    /// # Errors
    ///
    /// Propagates [`KeyError`] from [`TokenKey::resolve`].
    pub fn from_source(source: &dyn KeySource) -> Result<Self, KeyError> {
        let key = TokenKey::resolve(source)?;
        Ok(Self::new(&key))
    }

    /// Cipher in use.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Seal `record` into a fresh token.
    ///
    /// Two calls with the same record yield different tokens.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialize`] or [`CodecError::Encrypt`]; neither
    /// occurs for ordinary records.
    pub fn encode(&self, record: &Record) -> Result<String, CodecError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        self.encode_with_nonce(record, &nonce)
    }

    pub(crate) fn encode_with_nonce(
        &self,
        record: &Record,
        nonce: &[u8; NONCE_LEN],
    ) -> Result<String, CodecError> {
        let plaintext = record
            .to_canonical_bytes()
            .map_err(|e| CodecError::Serialize(e.to_string()))?;
        self.seal_bytes(&plaintext, nonce)
    }

    pub(crate) fn seal_bytes(
        &self,
        plaintext: &[u8],
        nonce: &[u8; NONCE_LEN],
    ) -> Result<String, CodecError> {
        let sealed = self
            .cipher
            .seal(nonce, plaintext)
            .map_err(|_| CodecError::Encrypt)?;

        let mut raw = Vec::with_capacity(NONCE_LEN + sealed.len());
        raw.extend_from_slice(nonce);
        raw.extend_from_slice(&sealed);
        Ok(TOKEN_ENGINE.encode(raw))
    }

    /// Authenticate `token` and recover its record.
    ///
    /// # Errors
    ///
    /// - [`CodecError::BadEncoding`]: not URL-safe base64, or shorter than
    ///   [`MIN_TOKEN_LEN`] bytes once decoded. No decryption is attempted.
    /// - [`CodecError::Forged`]: tag verification failed.
    /// - [`CodecError::Corrupt`]: authenticated, but not a record.
    pub fn decode(&self, token: &str) -> Result<Record, CodecError> {
        let raw = TOKEN_ENGINE
            .decode(token)
            .map_err(|e| CodecError::BadEncoding(e.to_string()))?;
        if raw.len() < MIN_TOKEN_LEN {
            return Err(CodecError::BadEncoding(format!(
                "token decodes to {} bytes, need at least {MIN_TOKEN_LEN}",
                raw.len()
            )));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .open(nonce, ciphertext)
            .map_err(|_| CodecError::Forged)?;

        Record::from_canonical_bytes(&plaintext).map_err(|e| CodecError::Corrupt(e.to_string()))
    }

    /// Decode `token`, collapsing every failure into [`Verdict::Invalid`].
    ///
    /// The precise failure is logged at debug level and dropped otherwise.
    pub fn verify(&self, token: &str) -> Verdict {
        match self.decode(token) {
            Ok(record) => {
                debug!(fields = record.len(), "token verified");
                Verdict::Valid(record)
            }
            Err(e) => {
                debug!(reason = e.kind(), token_len = token.len(), "token rejected");
                Verdict::Invalid
            }
        }
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
