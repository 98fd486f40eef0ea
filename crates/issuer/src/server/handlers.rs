//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use codec::record::{FIELD_CERT_ID, FIELD_ISSUED_AT, FIELD_NAME};
use codec::{Record, TokenCodec, Verdict};
use common::protocol::{
    CertificateView, ErrorResponse, HealthResponse, IssueRequest, VerifyRequest, VerifyResponse,
};
use common::ServiceError;
use tracing::{error, warn};

use super::state::AppState;
use crate::issuance::{FileKind, Storage};

/// `POST /certificates` — issue one certificate per line of `names`.
pub async fn issue(
    State(state): State<AppState>,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(bad_body(rejection)),
    };
    let now = Local::now().naive_local();
    match state.issuer.issue(&req.names, now).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /verify/:token` — verify the token embedded in a scanned URL.
pub async fn verify_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Json<VerifyResponse> {
    Json(verify_token(&state.codec, token.trim()))
}

/// `POST /verify` — verify a token pasted into a form.
pub async fn verify_submitted(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(bad_body(rejection)),
    };
    let token = req.token.trim();
    if token.is_empty() {
        return error_response(ServiceError::BadRequest("please provide a token".into()));
    }
    Json(verify_token(&state.codec, token)).into_response()
}

/// `GET /download/:filename` — download a batch token log.
pub async fn download_token_log(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    download(&state.storage, FileKind::TokenLog, &filename).await
}

/// `GET /qrcodes/:filename` — download a scannable-code image.
pub async fn download_qr(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    download(&state.storage, FileKind::QrCode, &filename).await
}

/// `GET /health` — liveness check.
///
/// A process without a usable key never starts serving, so reaching this
/// handler means the codec is ready.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        algorithm: state.codec.algorithm().to_string(),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode `token` and reduce the outcome to valid-with-data or a fixed error.
///
/// The failure kind is logged by [`TokenCodec::verify`] and never returned.
fn verify_token(codec: &TokenCodec, token: &str) -> VerifyResponse {
    match codec.verify(token) {
        Verdict::Valid(record) => VerifyResponse::valid(certificate_view(&record)),
        Verdict::Invalid => VerifyResponse::invalid(),
    }
}

fn certificate_view(record: &Record) -> CertificateView {
    let field = |key: &str, fallback: &str| record.get_str(key).unwrap_or(fallback).to_owned();
    CertificateView {
        name: field(FIELD_NAME, "Unknown"),
        cert_id: field(FIELD_CERT_ID, "N/A"),
        issued_at: field(FIELD_ISSUED_AT, "N/A"),
    }
}

async fn download(storage: &Storage, kind: FileKind, filename: &str) -> Response {
    match storage.read(kind, filename).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, kind.content_type().to_owned()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Malformed, mistyped or non-JSON bodies all become a 400 with a JSON error.
fn bad_body(rejection: JsonRejection) -> ServiceError {
    ServiceError::BadRequest(rejection.body_text())
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "request failed");
    } else {
        warn!(error = %err, "request rejected");
    }
    (status, Json(ErrorResponse::from(&err))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::router;
    use axum_test::TestServer;
    use common::protocol::{IssueResponse, INVALID_TOKEN_MESSAGE};
    use serde_json::json;

    fn server(root: &std::path::Path) -> TestServer {
        TestServer::new(router::build(AppState::for_tests(root))).unwrap()
    }

    async fn issue_one(server: &TestServer, name: &str) -> IssueResponse {
        let resp = server
            .post("/certificates")
            .json(&json!({ "names": name }))
            .await;
        resp.assert_status_ok();
        resp.json::<IssueResponse>()
    }

    #[tokio::test]
    async fn health_reports_algorithm() {
        let tmp = tempfile::tempdir().unwrap();
        let resp = server(tmp.path()).get("/health").await;
        resp.assert_status_ok();
        let body: HealthResponse = resp.json();
        assert_eq!(body.status, "ok");
        assert_eq!(body.algorithm, "AES-256-GCM");
    }

    #[tokio::test]
    async fn issued_link_verifies() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server(tmp.path());
        let issued = issue_one(&server, "Ada Lovelace").await;
        let cert = &issued.certificates[0];
        assert!(cert
            .verify_url
            .starts_with("http://localhost:5000/verify/"));

        let resp = server.get(&format!("/verify/{}", cert.token)).await;
        resp.assert_status_ok();
        let body: VerifyResponse = resp.json();
        assert!(body.valid);
        let view = body.certificate.unwrap();
        assert_eq!(view.name, "Ada Lovelace");
        assert_eq!(view.cert_id, cert.cert_id);
        assert!(chrono::NaiveDate::parse_from_str(&view.issued_at, "%Y-%m-%d").is_ok());
    }

    #[tokio::test]
    async fn pasted_token_is_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server(tmp.path());
        let issued = issue_one(&server, "Grace Hopper").await;
        let token = format!("  {}\n", issued.certificates[0].token);

        let resp = server.post("/verify").json(&json!({ "token": token })).await;
        resp.assert_status_ok();
        let body: VerifyResponse = resp.json();
        assert!(body.valid);
        assert_eq!(body.certificate.unwrap().name, "Grace Hopper");
    }

    #[tokio::test]
    async fn blank_pasted_token_is_bad_request() {
        let tmp = tempfile::tempdir().unwrap();
        let resp = server(tmp.path())
            .post("/verify")
            .json(&json!({ "token": "   " }))
            .await;
        resp.assert_status_bad_request();
        let body: ErrorResponse = resp.json();
        assert_eq!(body.code, "bad_request");
    }

    #[tokio::test]
    async fn failures_are_indistinguishable() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server(tmp.path());
        let issued = issue_one(&server, "Ada Lovelace").await;
        let token = &issued.certificates[0].token;

        // Forged: flip the last character to a different URL-safe one.
        let mut forged = token.clone();
        let last = forged.pop().unwrap();
        forged.push(if last == 'A' { 'Q' } else { 'A' });

        let foreign = {
            let key = codec::TokenKey::from_bytes(vec![0x01u8; 16]).unwrap();
            TokenCodec::new(&key)
                .encode(&Record::certificate("Mallory", "SKY-2024-9999", "2024-01-01"))
                .unwrap()
        };

        let mut bodies = Vec::new();
        for bad in ["AAAA", "not*base64", forged.as_str(), foreign.as_str()] {
            let resp = server.get(&format!("/verify/{bad}")).await;
            resp.assert_status_ok();
            bodies.push(resp.text());
        }
        let expected = serde_json::to_string(&VerifyResponse::invalid()).unwrap();
        for body in &bodies {
            assert_eq!(body, &expected);
            assert!(body.contains(INVALID_TOKEN_MESSAGE));
        }
    }

    #[tokio::test]
    async fn malformed_bodies_get_json_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server(tmp.path());

        let resp = server.post("/certificates").text("{not json").await;
        resp.assert_status_bad_request();
        assert_eq!(resp.json::<ErrorResponse>().code, "bad_request");

        let resp = server
            .post("/certificates")
            .json(&json!({ "names": 42 }))
            .await;
        resp.assert_status_bad_request();
        assert_eq!(resp.json::<ErrorResponse>().code, "bad_request");

        let resp = server.post("/verify").json(&json!({})).await;
        resp.assert_status_bad_request();
        assert_eq!(resp.json::<ErrorResponse>().code, "bad_request");
    }

    #[tokio::test]
    async fn empty_names_is_bad_request() {
        let tmp = tempfile::tempdir().unwrap();
        let resp = server(tmp.path())
            .post("/certificates")
            .json(&json!({ "names": "\n  \n" }))
            .await;
        resp.assert_status_bad_request();
        let body: ErrorResponse = resp.json();
        assert_eq!(body.message, "please provide names");
    }

    #[tokio::test]
    async fn token_log_downloads_as_attachment() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server(tmp.path());
        let issued = issue_one(&server, "Ada Lovelace\nGrace Hopper").await;

        let resp = server.get(&issued.token_log_download).await;
        resp.assert_status_ok();
        let disposition = resp.header(header::CONTENT_DISPOSITION);
        assert!(disposition
            .to_str()
            .unwrap()
            .starts_with("attachment;"));
        let text = resp.text();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with(&format!("Ada: {}", issued.certificates[0].token)));
    }

    #[tokio::test]
    async fn qr_downloads_as_svg() {
        let tmp = tempfile::tempdir().unwrap();
        let server = server(tmp.path());
        let issued = issue_one(&server, "Ada Lovelace").await;

        let resp = server.get(&issued.certificates[0].qr_download).await;
        resp.assert_status_ok();
        assert_eq!(resp.header(header::CONTENT_TYPE), "image/svg+xml");
        assert!(resp.text().contains("<svg"));
    }

    #[tokio::test]
    async fn download_rejects_traversal_and_missing() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("secret.txt"), "top secret").unwrap();
        let server = server(tmp.path());

        server
            .get("/download/..%2Fsecret.txt")
            .await
            .assert_status_not_found();
        server
            .get("/download/tokens_19700101_000000.txt")
            .await
            .assert_status_not_found();
    }

    #[test]
    fn certificate_view_fills_missing_fields() {
        let view = certificate_view(&Record::new().with("name", "Ada"));
        assert_eq!(view.name, "Ada");
        assert_eq!(view.cert_id, "N/A");
        assert_eq!(view.issued_at, "N/A");

        let view = certificate_view(&Record::new());
        assert_eq!(view.name, "Unknown");
    }
}
