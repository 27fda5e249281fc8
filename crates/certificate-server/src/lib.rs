//! Certificate Server - issuance API
//!
//! This crate records certificate entitlements, renders certificates to PDF
//! with a headless browser and publishes them to object storage.

pub mod config;
pub mod db;
pub mod entitlements;
pub mod error;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::AppError;
pub use routes::create_router;
pub use state::{AppState, PublishSettings};
