//! In-memory entitlement table for local development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EntitlementTable, StoreError};
use crate::models::EntitlementRecord;

/// Entitlement table held in process memory.
///
/// `put` overwrites unconditionally, the same as a DynamoDB `PutItem`.
#[derive(Debug, Default)]
pub struct InMemoryEntitlementTable {
    records: RwLock<HashMap<String, EntitlementRecord>>,
    writes: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl InMemoryEntitlementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn fail_with(&self, message: &str) {
        let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        *failure = Some(message.to_string());
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        let failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        match failure.as_ref() {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EntitlementTable for InMemoryEntitlementTable {
    async fn find_by_id(&self, id: &str) -> Result<Option<EntitlementRecord>, StoreError> {
        self.check_failure()?;
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(&self, record: &EntitlementRecord) -> Result<(), StoreError> {
        self.check_failure()?;
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
