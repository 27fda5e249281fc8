//! Wire types for certificate issuance.
//!
//! These are shared by the server (which decodes requests and encodes
//! responses) and the CLI (which does the opposite).

use serde::{Deserialize, Serialize};

/// Message returned with every successfully issued certificate.
pub const CERTIFICATE_CREATED_MESSAGE: &str = "Certificate created!";

/// Errors produced while decoding a certificate request body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid request body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid request body: field `id` must not be empty")]
    EmptyId,
}

/// Request to issue a certificate for one recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Stable identifier of the recipient. Also names the stored PDF.
    pub id: String,
    /// Display name printed on the certificate.
    pub name: String,
    /// Display grade printed on the certificate.
    pub grade: String,
}

impl CertificateRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grade: grade.into(),
        }
    }

    /// Decodes a raw JSON request body.
    ///
    /// All three fields must be present and be strings. Extra fields are
    /// ignored. An empty `id` is treated as missing.
    pub fn from_json(body: &[u8]) -> Result<Self, DecodeError> {
        let request: CertificateRequest = serde_json::from_slice(body)?;
        if request.id.is_empty() {
            return Err(DecodeError::EmptyId);
        }
        Ok(request)
    }
}

/// Body of a successful issuance response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateResponse {
    pub message: String,
    /// Public URL of the uploaded PDF.
    pub url: String,
}

impl CertificateResponse {
    pub fn created(url: String) -> Self {
        Self {
            message: CERTIFICATE_CREATED_MESSAGE.to_string(),
            url,
        }
    }
}

/// Body of a failed issuance response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error kind, e.g. `decode_error`.
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
