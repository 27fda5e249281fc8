//! DynamoDB entitlement table.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use super::{EntitlementTable, StoreError};
use crate::models::EntitlementRecord;

/// Default table name.
pub const DEFAULT_TABLE: &str = "users_certificates";

/// Entitlement table stored in DynamoDB with `id` as the partition key.
#[derive(Debug, Clone)]
pub struct DynamoEntitlementTable {
    client: Client,
    table: String,
}

impl DynamoEntitlementTable {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Builds a client from shared AWS configuration, optionally pointed at
    /// a local endpoint such as DynamoDB Local.
    pub fn from_sdk_config(
        sdk_config: &aws_config::SdkConfig,
        endpoint: Option<&str>,
        table: impl Into<String>,
    ) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self::new(Client::from_conf(builder.build()), table)
    }
}

#[async_trait]
impl EntitlementTable for DynamoEntitlementTable {
    async fn find_by_id(&self, id: &str) -> Result<Option<EntitlementRecord>, StoreError> {
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("id = :id")
            .expression_attribute_values(":id", AttributeValue::S(id.to_string()))
            .limit(1)
            .send()
            .await
            .map_err(|e| StoreError::Dynamo {
                operation: "query",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        output.items().first().map(record_from_item).transpose()
    }

    async fn put(&self, record: &EntitlementRecord) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item("id", AttributeValue::S(record.id.clone()))
            .item("name", AttributeValue::S(record.name.clone()))
            .item("grade", AttributeValue::S(record.grade.clone()))
            .send()
            .await
            .map_err(|e| StoreError::Dynamo {
                operation: "put_item",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}

fn record_from_item(item: &HashMap<String, AttributeValue>) -> Result<EntitlementRecord, StoreError> {
    let id = string_attribute(item, "id", "<unknown>")?;
    Ok(EntitlementRecord {
        name: string_attribute(item, "name", &id)?,
        grade: string_attribute(item, "grade", &id)?,
        id,
    })
}

fn string_attribute(
    item: &HashMap<String, AttributeValue>,
    attribute: &str,
    id: &str,
) -> Result<String, StoreError> {
    match item.get(attribute) {
        Some(AttributeValue::S(value)) => Ok(value.clone()),
        Some(_) => Err(StoreError::Malformed {
            id: id.to_string(),
            detail: format!("attribute '{}' is not a string", attribute),
        }),
        None => Err(StoreError::Malformed {
            id: id.to_string(),
            detail: format!("attribute '{}' is missing", attribute),
        }),
    }
}
