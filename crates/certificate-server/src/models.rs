//! Persisted models for the certificate server.

pub mod entitlement;

pub use entitlement::EntitlementRecord;
