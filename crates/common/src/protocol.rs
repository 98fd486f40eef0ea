//! Request and response types exchanged with the issuer service.
//!
//! Serialised as JSON over the HTTP API; `certctl` reuses the verification
//! types for its output.

use serde::{Deserialize, Serialize};

/// User-facing message for every rejected token, whatever the cause.
pub const INVALID_TOKEN_MESSAGE: &str = "invalid or tampered token";

// ---------------------------------------------------------------------------
// Issue endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /certificates`.
///
/// `names` is free text with one full name per line, as pasted into a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Newline-separated list of names.
    pub names: String,
}

/// One certificate issued by `POST /certificates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCertificate {
    /// First word of the name, capitalised.
    pub first_name: String,
    /// Name exactly as submitted (trimmed).
    pub full_name: String,
    /// Certificate identifier, e.g. `SKY-2024-0001`.
    pub cert_id: String,
    /// Sealed token.
    pub token: String,
    /// Verification URL embedding the token.
    pub verify_url: String,
    /// Scannable code of `verify_url` as base64-encoded SVG, for inline display.
    pub qr_svg_base64: String,
    /// Path the scannable code can be downloaded from.
    pub qr_download: String,
}

/// Successful response body for `POST /certificates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    /// Issued certificates, in input order.
    pub certificates: Vec<IssuedCertificate>,
    /// File name of the token log written for this batch.
    pub token_log: String,
    /// Path the token log can be downloaded from.
    pub token_log_download: String,
}

// ---------------------------------------------------------------------------
// Verify endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Token as pasted by the user; surrounding whitespace is ignored.
    pub token: String,
}

/// Certificate data recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateView {
    pub name: String,
    pub cert_id: String,
    pub issued_at: String,
}

/// Response body for both verify routes.
///
/// Exactly one of `certificate` / `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    /// A successful verification.
    pub fn valid(certificate: CertificateView) -> Self {
        Self {
            valid: true,
            certificate: Some(certificate),
            error: None,
        }
    }

    /// A failed verification. Carries no detail about why.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            certificate: None,
            error: Some(INVALID_TOKEN_MESSAGE.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.public_message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` once the service is serving; a missing key prevents startup.
    pub status: String,
    /// Crate version of the running binary.
    pub version: String,
    /// Token cipher in use, e.g. `"AES-256-GCM"`.
    pub algorithm: String,
}
