//! Amazon S3 object store.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;

use super::{ObjectAcl, ObjectStore, StorageError, StoredObject};

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client from shared AWS configuration. A custom endpoint
    /// (e.g. a local S3 emulator) switches to path-style addressing.
    pub fn from_sdk_config(
        sdk_config: &aws_config::SdkConfig,
        endpoint: Option<&str>,
        bucket: impl Into<String>,
    ) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()), bucket)
    }
}

fn canned_acl(acl: ObjectAcl) -> ObjectCannedAcl {
    match acl {
        ObjectAcl::Private => ObjectCannedAcl::Private,
        ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, object: StoredObject) -> Result<(), StorageError> {
        let StoredObject {
            key,
            body,
            content_type,
            acl,
        } = object;

        tracing::debug!(bucket = %self.bucket, key = %key, bytes = body.len(), "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .acl(canned_acl(acl))
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Put {
                key: key.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
