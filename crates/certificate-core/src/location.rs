//! Object storage addressing for issued certificates.

use serde::{Deserialize, Serialize};

/// Bucket certificates are published to unless configured otherwise.
pub const DEFAULT_BUCKET: &str = "serverless-certificates-ignite-nodejs";

/// Region of [`DEFAULT_BUCKET`].
pub const DEFAULT_REGION: &str = "sa-east-1";

/// Content type of every published certificate.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Where certificates live in object storage.
///
/// Keys and URLs are pure functions of the certificate id, so a repeated
/// request for the same id always lands on (and overwrites) the same object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub region: String,
}

impl Default for ObjectLocation {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET, DEFAULT_REGION)
    }
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    /// Returns the object key for a certificate id.
    pub fn object_key(&self, id: &str) -> String {
        format!("{}.pdf", id)
    }

    /// Returns the public, virtual-hosted-style URL for a certificate id.
    pub fn public_url(&self, id: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket,
            self.region,
            self.object_key(id)
        )
    }
}
