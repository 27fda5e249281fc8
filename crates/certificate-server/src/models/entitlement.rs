//! Entitlement model: proof that an id has been granted a certificate.

use certificate_core::CertificateRequest;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents an entitlement stored in the `users_certificates` table.
///
/// Keyed uniquely by `id`. Holds the name and grade of the first grant;
/// never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct EntitlementRecord {
    /// Recipient identifier (partition key).
    pub id: String,
    /// Name used for the first grant.
    pub name: String,
    /// Grade used for the first grant.
    pub grade: String,
}

impl From<&CertificateRequest> for EntitlementRecord {
    fn from(request: &CertificateRequest) -> Self {
        Self {
            id: request.id.clone(),
            name: request.name.clone(),
            grade: request.grade.clone(),
        }
    }
}

impl EntitlementRecord {
    /// Returns true if the request carries the same name and grade as this record.
    pub fn matches(&self, request: &CertificateRequest) -> bool {
        self.name == request.name && self.grade == request.grade
    }
}
