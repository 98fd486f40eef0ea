//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: no names, empty token, unparseable body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested file or route does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A token could not be sealed.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// An unexpected internal error occurred (filesystem, rendering).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to return to callers.
    ///
    /// Server-side failures are reduced to a fixed string; the detail is for logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::BadRequest(m) | ServiceError::NotFound(m) => m.clone(),
            ServiceError::EncryptionFailure(_) => "token issuance failed".into(),
            ServiceError::Internal(_) => "internal error".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::NotFound("x".into()).http_status(), 404);
        assert_eq!(
            ServiceError::EncryptionFailure("x".into()).http_status(),
            500
        );
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("please provide names".into());
        assert!(e.to_string().contains("please provide names"));
    }

    #[test]
    fn public_message_hides_internal_detail() {
        let e = ServiceError::Internal("open /srv/static/downloads: EACCES".into());
        assert_eq!(e.public_message(), "internal error");
        assert_eq!(e.code(), "internal_error");
        let e = ServiceError::NotFound("no such file".into());
        assert_eq!(e.public_message(), "no such file");
    }
}
