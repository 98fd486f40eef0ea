//! Certificate issuance: names in, tokens, verification URLs and scannable codes out.
//!
//! For every name in a batch the [`Issuer`]:
//! 1. builds a `{name, cert_id, issued_at}` [`Record`],
//! 2. seals it into a token with the shared [`TokenCodec`],
//! 3. embeds the token in `<base_url>/verify/<token>` and renders that URL as
//!    an SVG QR code saved to the QR directory,
//! 4. appends `<first name>: <token>` to the batch's token log.
//!
//! Nothing about an issued certificate is retained beyond those files.

pub mod names;
pub mod qr;
pub mod storage;

pub use storage::{FileKind, Storage};

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Datelike, NaiveDateTime};
use codec::{Record, TokenCodec};
use common::protocol::{IssueResponse, IssuedCertificate};
use common::ServiceError;
use tracing::info;

/// Issues certificate batches.
#[derive(Debug, Clone)]
pub struct Issuer {
    codec: Arc<TokenCodec>,
    storage: Storage,
    base_url: String,
    cert_id_prefix: String,
}

impl Issuer {
    /// `base_url` must not end with `/`; [`crate::config::Config`] strips it.
    pub fn new(
        codec: Arc<TokenCodec>,
        storage: Storage,
        base_url: impl Into<String>,
        cert_id_prefix: impl Into<String>,
    ) -> Self {
        Self {
            codec,
            storage,
            base_url: base_url.into(),
            cert_id_prefix: cert_id_prefix.into(),
        }
    }

    /// Verification URL for `token`.
    pub fn verify_url(&self, token: &str) -> String {
        format!("{}/verify/{token}", self.base_url)
    }

    /// Issue one certificate per non-blank line of `names_text`, dated `now`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::BadRequest`] if there are no names.
    /// - [`ServiceError::EncryptionFailure`] if a token cannot be sealed.
    /// - [`ServiceError::Internal`] if rendering or writing output fails.
    pub async fn issue(
        &self,
        names_text: &str,
        now: NaiveDateTime,
    ) -> Result<IssueResponse, ServiceError> {
        let full_names = names::parse_names(names_text);
        if full_names.is_empty() {
            return Err(ServiceError::BadRequest("please provide names".into()));
        }

        let issued_at = now.format("%Y-%m-%d").to_string();
        let token_log = format!("tokens_{}.txt", now.format("%Y%m%d_%H%M%S"));

        let mut log = String::new();
        let mut certificates = Vec::with_capacity(full_names.len());

        for (idx, full_name) in full_names.into_iter().enumerate() {
            let first_name = names::first_name(&full_name);
            let cert_id = names::cert_id(&self.cert_id_prefix, now.year(), idx + 1);

            let record = Record::certificate(&full_name, &cert_id, &issued_at);
            let token = self
                .codec
                .encode(&record)
                .map_err(|e| ServiceError::EncryptionFailure(e.to_string()))?;

            let verify_url = self.verify_url(&token);
            let svg = qr::render_svg(&verify_url)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            let qr_file = format!("{}_{cert_id}.svg", names::file_stem(&first_name));
            self.storage.write(FileKind::QrCode, &qr_file, &svg).await?;

            log.push_str(&format!("{first_name}: {token}\n"));

            certificates.push(IssuedCertificate {
                qr_svg_base64: STANDARD.encode(svg.as_bytes()),
                qr_download: format!("/qrcodes/{qr_file}"),
                first_name,
                full_name,
                cert_id,
                token,
                verify_url,
            });
        }

        self.storage
            .write(FileKind::TokenLog, &token_log, log)
            .await?;

        info!(
            count = certificates.len(),
            token_log = %token_log,
            "issued certificate batch"
        );

        Ok(IssueResponse {
            certificates,
            token_log_download: format!("/download/{token_log}"),
            token_log,
        })
    }
}
