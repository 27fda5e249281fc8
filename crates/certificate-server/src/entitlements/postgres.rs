//! PostgreSQL entitlement table.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{EntitlementTable, StoreError};
use crate::models::EntitlementRecord;

/// Entitlement table backed by the `users_certificates` relation.
#[derive(Debug, Clone)]
pub struct PgEntitlementTable {
    pool: PgPool,
}

impl PgEntitlementTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementTable for PgEntitlementTable {
    async fn find_by_id(&self, id: &str) -> Result<Option<EntitlementRecord>, StoreError> {
        let record = sqlx::query_as::<_, EntitlementRecord>(
            "SELECT id, name, grade FROM users_certificates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Inserts the record. A row that already exists for the id is kept, so
    /// a lost check-then-insert race leaves the first writer's values.
    async fn put(&self, record: &EntitlementRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users_certificates (id, name, grade, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.grade)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
