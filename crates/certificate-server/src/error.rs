//! Error types for the certificate server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use certificate_core::{AssetError, DecodeError, ErrorResponse};

use crate::entitlements::StoreError;
use crate::pdf::RenderError;
use crate::storage::StorageError;

/// Application error type.
///
/// One variant per pipeline failure kind. None of them are retried; each
/// aborts the request and is mapped to a non-2xx response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Entitlement store error: {0}")]
    Store(#[from] StoreError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Render engine error: {0}")]
    Render(#[from] RenderError),

    #[error("Upload error: {0}")]
    Upload(#[from] StorageError),
}

impl AppError {
    /// Machine-readable kind reported in the error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Decode(_) => "decode_error",
            AppError::Store(_) => "store_access_error",
            AppError::Asset(_) => "asset_load_error",
            AppError::Render(RenderError::Timeout { .. }) => "render_timeout",
            AppError::Render(_) => "render_engine_error",
            AppError::Upload(_) => "upload_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::Render(RenderError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Decode(e) => {
                tracing::warn!("Rejected request: {}", e);
                e.to_string()
            }
            AppError::Render(RenderError::Timeout { .. }) => {
                tracing::error!("Render timeout: {}", self);
                "Certificate rendering timed out".to_string()
            }
            _ => {
                tracing::error!(kind = self.kind(), "{}", self);
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse::new(self.kind(), message))).into_response()
    }
}
