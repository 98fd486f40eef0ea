//! Key material: where it comes from, how it is decoded, and which cipher it selects.

use std::fmt;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::KeyError;

/// Environment variable consulted by [`EnvKeySource::default`].
pub const DEFAULT_KEY_VAR: &str = "ENCRYPTION_KEY";

/// Length of a hex-encoded 32-byte key. Key text of exactly this length is
/// always treated as hex.
const HEX_KEY_CHARS: usize = 64;

/// A place the textual token key can be read from.
///
/// Injected into [`TokenKey::resolve`] so the codec can be built in tests
/// without touching the process environment.
#[cfg_attr(test, mockall::automock)]
pub trait KeySource {
    /// Name used in error messages, e.g. the environment variable name.
    fn describe(&self) -> String;

    /// The raw key text, or `None` if the source has nothing.
    fn secret(&self) -> Option<String>;
}

/// Reads the key from a process environment variable.
#[derive(Debug, Clone)]
pub struct EnvKeySource {
    var: String,
}

impl EnvKeySource {
    /// Read the key from the environment variable `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_VAR)
    }
}

impl KeySource for EnvKeySource {
    fn describe(&self) -> String {
        self.var.clone()
    }

    fn secret(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// A key given directly as text, e.g. from a CLI flag or a test fixture.
#[derive(Clone)]
pub struct StaticKeySource(pub String);

impl KeySource for StaticKeySource {
    fn describe(&self) -> String {
        "static key".into()
    }

    fn secret(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

impl fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticKeySource([REDACTED])")
    }
}

/// AES-GCM variant selected by the key length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// 16-byte key.
    Aes128Gcm,
    /// 24-byte key.
    Aes192Gcm,
    /// 32-byte key.
    Aes256Gcm,
}

impl Algorithm {
    /// Map a raw key length to its cipher, if it is a valid AES key size.
    pub fn for_key_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(Algorithm::Aes128Gcm),
            24 => Some(Algorithm::Aes192Gcm),
            32 => Some(Algorithm::Aes256Gcm),
            _ => None,
        }
    }

    /// Raw key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Algorithm::Aes128Gcm => 16,
            Algorithm::Aes192Gcm => 24,
            Algorithm::Aes256Gcm => 32,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Aes128Gcm => "AES-128-GCM",
            Algorithm::Aes192Gcm => "AES-192-GCM",
            Algorithm::Aes256Gcm => "AES-256-GCM",
        })
    }
}

/// Decoded symmetric key, 16, 24 or 32 bytes long.
///
/// The bytes are overwritten with zeroes on drop and never printed. Ciphers
/// built from it zero their own key schedule on drop as well.
#[derive(Clone)]
pub struct TokenKey {
    bytes: Vec<u8>,
    algorithm: Algorithm,
}

impl TokenKey {
    /// Resolve the key from `source`.
    ///
    /// Surrounding whitespace is ignored. Text of exactly 64 characters is
    /// decoded as hex; anything else as standard, padded base64.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Missing`] if the source is unset or blank, and
    /// [`KeyError::InvalidFormat`] if decoding fails or yields a length other
    /// than 16, 24 or 32 bytes.
    pub fn resolve(source: &dyn KeySource) -> Result<Self, KeyError> {
        let source_name = source.describe();
        let text = Zeroizing::new(source.secret().unwrap_or_default());
        let text = text.trim();
        if text.is_empty() {
            return Err(KeyError::Missing { source_name });
        }

        let invalid = |reason: String| KeyError::InvalidFormat {
            source_name: source_name.clone(),
            reason,
        };

        let bytes = if text.len() == HEX_KEY_CHARS {
            hex::decode(text).map_err(|_| invalid("not valid hex".into()))?
        } else {
            STANDARD
                .decode(text)
                .map_err(|_| invalid("not valid base64".into()))?
        };

        Self::from_bytes(bytes).map_err(|len| {
            invalid(format!(
                "decoded to {len} bytes, expected 16, 24 or 32"
            ))
        })
    }

    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns the offending length if it is not a valid AES key size.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, usize> {
        match Algorithm::for_key_len(bytes.len()) {
            Some(algorithm) => Ok(Self { bytes, algorithm }),
            None => {
                let len = bytes.len();
                let mut bytes = bytes;
                bytes.zeroize();
                Err(len)
            }
        }
    }

    /// Draw a fresh key for `algorithm` from the OS CSPRNG.
    pub fn generate(algorithm: Algorithm) -> Self {
        let mut bytes = vec![0u8; algorithm.key_len()];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes, algorithm }
    }

    /// Cipher selected by this key's length.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Key as lowercase hex, the form accepted for 32-byte keys.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Key as standard padded base64, accepted for every key size.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for TokenKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl ZeroizeOnDrop for TokenKey {}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenKey({}, [REDACTED])", self.algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_source(secret: Option<&str>) -> MockKeySource {
        let secret = secret.map(str::to_owned);
        let mut source = MockKeySource::new();
        source
            .expect_describe()
            .return_const("ENCRYPTION_KEY".to_string());
        source.expect_secret().return_const(secret);
        source
    }

    #[test]
    fn unset_key_is_missing() {
        let err = TokenKey::resolve(&mock_source(None)).unwrap_err();
        assert_eq!(
            err,
            KeyError::Missing {
                source_name: "ENCRYPTION_KEY".into()
            }
        );
    }

    #[test]
    fn empty_and_blank_keys_are_missing() {
        for text in ["", "   ", "\n"] {
            let err = TokenKey::resolve(&mock_source(Some(text))).unwrap_err();
            assert!(matches!(err, KeyError::Missing { .. }), "{text:?}");
        }
    }

    #[test]
    fn hex_key_of_64_chars_selects_aes256() {
        let text = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
        let key = TokenKey::resolve(&mock_source(Some(text))).unwrap();
        assert_eq!(key.algorithm(), Algorithm::Aes256Gcm);
        assert_eq!(key.as_bytes()[1], 0x11);
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn bad_hex_of_64_chars_is_invalid_not_base64() {
        // 64 chars of valid base64 (48 bytes) must still take the hex branch.
        let text = STANDARD.encode([0xabu8; 48]);
        assert_eq!(text.len(), 64);
        let err = TokenKey::resolve(&mock_source(Some(&text))).unwrap_err();
        match err {
            KeyError::InvalidFormat { reason, .. } => assert_eq!(reason, "not valid hex"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn base64_keys_select_cipher_by_length() {
        let cases = [
            (16, Algorithm::Aes128Gcm),
            (24, Algorithm::Aes192Gcm),
            (32, Algorithm::Aes256Gcm),
        ];
        for (len, algorithm) in cases {
            let text = STANDARD.encode(vec![0x5au8; len]);
            let key = TokenKey::resolve(&mock_source(Some(&text))).unwrap();
            assert_eq!(key.algorithm(), algorithm);
            assert_eq!(key.as_bytes(), vec![0x5au8; len].as_slice());
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let text = format!("  {}\n", STANDARD.encode([1u8; 32]));
        assert!(TokenKey::resolve(&mock_source(Some(&text))).is_ok());
    }

    #[test]
    fn base64_of_wrong_length_is_invalid() {
        for len in [1usize, 15, 17, 31, 33, 48] {
            let text = STANDARD.encode(vec![9u8; len]);
            if text.len() == HEX_KEY_CHARS {
                continue;
            }
            let err = TokenKey::resolve(&mock_source(Some(&text))).unwrap_err();
            match err {
                KeyError::InvalidFormat { reason, .. } => {
                    assert!(reason.contains(&format!("{len} bytes")), "{reason}")
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn garbage_is_invalid_and_not_echoed() {
        let text = "this is definitely not base64!";
        let err = TokenKey::resolve(&mock_source(Some(text))).unwrap_err();
        assert!(matches!(err, KeyError::InvalidFormat { .. }));
        assert!(!err.to_string().contains("definitely"));
    }

    #[test]
    fn unpadded_base64_is_rejected() {
        let text = STANDARD.encode([3u8; 16]);
        let unpadded = text.trim_end_matches('=');
        assert_ne!(text, unpadded);
        let err = TokenKey::resolve(&mock_source(Some(unpadded))).unwrap_err();
        assert!(matches!(err, KeyError::InvalidFormat { .. }));
    }

    #[test]
    fn static_source_resolves() {
        let source = StaticKeySource(STANDARD.encode([2u8; 24]));
        let key = TokenKey::resolve(&source).unwrap();
        assert_eq!(key.algorithm(), Algorithm::Aes192Gcm);
        assert!(format!("{source:?}").contains("REDACTED"));
    }

    #[test]
    fn env_source_reports_variable_name() {
        let source = EnvKeySource::new("CERTSEAL_TEST_KEY_THAT_IS_NEVER_SET");
        assert_eq!(source.describe(), "CERTSEAL_TEST_KEY_THAT_IS_NEVER_SET");
        let err = TokenKey::resolve(&source).unwrap_err();
        assert!(err.to_string().contains("CERTSEAL_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = TokenKey::from_bytes(vec![0xffu8; 16]).unwrap();
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(dbg.contains("AES-128-GCM"));
        assert!(!dbg.contains("255"));
    }

    #[test]
    fn generated_keys_resolve_back() {
        for algorithm in [
            Algorithm::Aes128Gcm,
            Algorithm::Aes192Gcm,
            Algorithm::Aes256Gcm,
        ] {
            let key = TokenKey::generate(algorithm);
            assert_eq!(key.as_bytes().len(), algorithm.key_len());
            let back = TokenKey::resolve(&StaticKeySource(key.to_base64())).unwrap();
            assert_eq!(back.as_bytes(), key.as_bytes());
        }

        let key = TokenKey::generate(Algorithm::Aes256Gcm);
        assert_eq!(key.to_hex().len(), HEX_KEY_CHARS);
        let back = TokenKey::resolve(&StaticKeySource(key.to_hex())).unwrap();
        assert_eq!(back.as_bytes(), key.as_bytes());
    }

    #[test]
    fn generated_keys_differ() {
        let a = TokenKey::generate(Algorithm::Aes256Gcm);
        let b = TokenKey::generate(Algorithm::Aes256Gcm);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn key_material_is_wiped_on_drop() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<TokenKey>();
        assert_zeroize_on_drop::<aes::Aes128>();
        assert_zeroize_on_drop::<aes::Aes192>();
        assert_zeroize_on_drop::<aes::Aes256>();
    }

    #[test]
    fn from_bytes_rejects_bad_length() {
        assert_eq!(TokenKey::from_bytes(vec![0u8; 20]).unwrap_err(), 20);
    }
}
