//! Entitlement store gate.
//!
//! The gate records at most one entitlement per certificate id. The table
//! itself is an external collaborator behind [`EntitlementTable`]; three
//! backends are provided (DynamoDB, PostgreSQL and in-memory).
//!
//! The check and the insert are two separate single-key operations. Two
//! concurrent first requests for the same id can both observe "absent" and
//! both write; which write survives is up to the backend (DynamoDB: last
//! put wins, PostgreSQL: first insert wins).

pub mod dynamo;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use certificate_core::CertificateRequest;

use crate::models::EntitlementRecord;

pub use dynamo::DynamoEntitlementTable;
pub use memory::InMemoryEntitlementTable;
pub use postgres::PgEntitlementTable;

/// Errors raised by an entitlement table backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("DynamoDB {operation} failed: {message}")]
    Dynamo {
        operation: &'static str,
        message: String,
    },

    #[error("Malformed entitlement record '{id}': {detail}")]
    Malformed { id: String, detail: String },

    #[error("Entitlement table unavailable: {0}")]
    Unavailable(String),
}

/// Key/value table holding entitlement records keyed by id.
#[async_trait]
pub trait EntitlementTable: Send + Sync {
    /// Exact-match lookup by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<EntitlementRecord>, StoreError>;

    /// Writes a record.
    async fn put(&self, record: &EntitlementRecord) -> Result<(), StoreError>;
}

/// Outcome of [`ensure_entitlement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementStatus {
    /// No record existed; this one was written.
    Created(EntitlementRecord),
    /// A record already existed and was left untouched.
    Existing(EntitlementRecord),
}

impl EntitlementStatus {
    pub fn record(&self) -> &EntitlementRecord {
        match self {
            EntitlementStatus::Created(record) | EntitlementStatus::Existing(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, EntitlementStatus::Created(_))
    }
}

/// Records an entitlement for the request's id unless one already exists.
///
/// An existing record is never updated, even when the request carries a
/// different name or grade. Callers keep rendering with the request's
/// values, so the published document can diverge from the stored record.
pub async fn ensure_entitlement(
    table: &dyn EntitlementTable,
    request: &CertificateRequest,
) -> Result<EntitlementStatus, StoreError> {
    if let Some(existing) = table.find_by_id(&request.id).await? {
        if !existing.matches(request) {
            tracing::warn!(
                id = %request.id,
                stored_name = %existing.name,
                stored_grade = %existing.grade,
                "Entitlement already recorded with different values; keeping stored record"
            );
        }
        return Ok(EntitlementStatus::Existing(existing));
    }

    let record = EntitlementRecord::from(request);
    table.put(&record).await?;
    tracing::info!(id = %record.id, "Entitlement recorded");

    Ok(EntitlementStatus::Created(record))
}
