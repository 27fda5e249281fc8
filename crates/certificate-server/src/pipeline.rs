//! Certificate issuance pipeline.
//!
//! Stages run strictly in order:
//! `Decoded → EntitlementChecked → Rendered → PdfGenerated → Published → ResponseReady`.
//! The first failing stage aborts the request; later stages never run, so
//! nothing is uploaded unless rendering succeeded.

use std::fmt;

use certificate_core::{CertificateRequest, PDF_CONTENT_TYPE};
use chrono::NaiveDate;

use crate::entitlements::{ensure_entitlement, EntitlementStatus};
use crate::error::AppError;
use crate::pdf::render_pdf;
use crate::state::AppState;
use crate::storage::{ObjectAcl, StoredObject};

/// Pipeline stage, named after the state reached once it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decoded,
    EntitlementChecked,
    Rendered,
    PdfGenerated,
    Published,
    ResponseReady,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decoded => "decoded",
            Stage::EntitlementChecked => "entitlement_checked",
            Stage::Rendered => "rendered",
            Stage::PdfGenerated => "pdf_generated",
            Stage::Published => "published",
            Stage::ResponseReady => "response_ready",
        };
        f.write_str(name)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    /// Object key the PDF was uploaded under.
    pub key: String,
    /// Public URL of the PDF.
    pub url: String,
    pub entitlement: EntitlementStatus,
}

fn reached(id: &str, stage: Stage) {
    tracing::debug!(id = %id, stage = %stage, "Certificate stage complete");
}

fn failed<E: Into<AppError>>(id: &str, stage: Stage, err: E) -> AppError {
    let err = err.into();
    tracing::warn!(id = %id, stage = %stage, kind = err.kind(), "Certificate pipeline failed");
    err
}

/// Issues a certificate for an already decoded request.
///
/// `issued_on` is the date printed on the certificate. The request's name
/// and grade are rendered even when an older entitlement with different
/// values exists.
pub async fn issue_certificate(
    state: &AppState,
    request: &CertificateRequest,
    issued_on: NaiveDate,
) -> Result<IssuedCertificate, AppError> {
    let id = request.id.as_str();
    let publishing = &state.publishing;
    reached(id, Stage::Decoded);

    let entitlement = ensure_entitlement(state.entitlements.as_ref(), request)
        .await
        .map_err(|e| failed(id, Stage::EntitlementChecked, e))?;
    reached(id, Stage::EntitlementChecked);

    let context = state.assets.context_for(request, issued_on);
    let html = state
        .assets
        .render(&context)
        .map_err(|e| failed(id, Stage::Rendered, e))?;
    reached(id, Stage::Rendered);

    let pdf = render_pdf(
        state.renderer.as_ref(),
        &html,
        &publishing.pdf_options,
        &publishing.limits,
    )
    .await
    .map_err(|e| failed(id, Stage::PdfGenerated, e))?;
    reached(id, Stage::PdfGenerated);

    if let Some(path) = &publishing.offline_copy {
        match tokio::fs::write(path, &pdf).await {
            Ok(()) => tracing::info!(path = %path.display(), "Wrote offline certificate copy"),
            Err(e) => tracing::warn!(path = %path.display(), "Failed to write offline copy: {}", e),
        }
    }

    let key = publishing.location.object_key(id);
    let bytes = pdf.len();
    state
        .objects
        .put_object(StoredObject {
            key: key.clone(),
            body: pdf,
            content_type: PDF_CONTENT_TYPE.to_string(),
            acl: ObjectAcl::PublicRead,
        })
        .await
        .map_err(|e| failed(id, Stage::Published, e))?;
    reached(id, Stage::Published);

    let url = publishing.location.public_url(id);
    tracing::info!(
        id = %id,
        key = %key,
        bytes,
        created = entitlement.is_created(),
        "Certificate published"
    );
    reached(id, Stage::ResponseReady);

    Ok(IssuedCertificate {
        key,
        url,
        entitlement,
    })
}
