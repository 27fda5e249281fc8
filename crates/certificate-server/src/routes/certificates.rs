//! Certificate issuance endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use certificate_core::{CertificateRequest, CertificateResponse};
use chrono::Local;

use crate::error::AppError;
use crate::pipeline::issue_certificate;
use crate::state::AppState;

/// Creates the certificates router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_certificate))
}

/// POST /api/v1/certificates
///
/// Accepts `{id, name, grade}`, records the entitlement if new, renders and
/// publishes the PDF, and returns 201 with its public URL.
///
/// The body is taken raw so malformed JSON maps to our own 400 response
/// rather than the extractor's rejection.
pub(crate) async fn create_certificate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CertificateResponse>), AppError> {
    let request = CertificateRequest::from_json(&body)?;
    let issued_on = Local::now().date_naive();

    let issued = issue_certificate(&state, &request, issued_on).await?;

    Ok((StatusCode::CREATED, Json(CertificateResponse::created(issued.url))))
}
