//! In-memory object store for local development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ObjectStore, StorageError, StoredObject};

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    failure: Mutex<Option<String>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent upload fail.
    pub fn fail_with(&self, message: &str) {
        let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        *failure = Some(message.to_string());
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, object: StoredObject) -> Result<(), StorageError> {
        let failure = self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(message) = failure {
            return Err(StorageError::Put {
                key: object.key,
                message,
            });
        }

        self.objects.write().await.insert(object.key.clone(), object);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectAcl;

    fn object(key: &str, body: &[u8]) -> StoredObject {
        StoredObject {
            key: key.to_string(),
            body: body.to_vec(),
            content_type: "application/pdf".to_string(),
            acl: ObjectAcl::PublicRead,
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = InMemoryObjectStore::new();
        store.put_object(object("e7.pdf", b"%PDF-1")).await.unwrap();

        let stored = store.get("e7.pdf").await.unwrap();
        assert_eq!(stored.body, b"%PDF-1");
        assert_eq!(stored.acl, ObjectAcl::PublicRead);
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = InMemoryObjectStore::new();
        store.put_object(object("e7.pdf", b"first")).await.unwrap();
        store.put_object(object("e7.pdf", b"second")).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("e7.pdf").await.unwrap().body, b"second");
    }

    #[tokio::test]
    async fn test_fail_with() {
        let store = InMemoryObjectStore::new();
        store.fail_with("access denied");

        let err = store.put_object(object("e7.pdf", b"x")).await.unwrap_err();
        assert!(err.to_string().contains("e7.pdf"));
        assert!(store.is_empty().await);
    }
}
