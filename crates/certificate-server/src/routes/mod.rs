//! API routes for the certificate server.

pub mod certificates;

use axum::routing::post;
use axum::Router;

use crate::state::AppState;

/// Creates the main API router with all routes mounted.
///
/// `POST /generateCertificate` is kept alongside the versioned route for
/// clients of the original serverless endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/generateCertificate", post(certificates::create_certificate))
        .with_state(state)
}

/// Creates the v1 API routes.
fn api_v1_routes() -> Router<AppState> {
    Router::new().nest("/certificates", certificates::router())
}
