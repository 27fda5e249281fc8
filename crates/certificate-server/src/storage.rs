//! Object storage for published certificates.

pub mod memory;
pub mod s3;

use async_trait::async_trait;

pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

/// Errors raised by an object store backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to upload '{key}': {message}")]
    Put { key: String, message: String },
}

/// Access control applied to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    Private,
    PublicRead,
}

/// One object to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub acl: ObjectAcl,
}

/// Durable object storage. A put to an existing key overwrites it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, object: StoredObject) -> Result<(), StorageError>;
}
