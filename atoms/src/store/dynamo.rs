use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, Utc};

use super::{order_snapshots, Direction, Document, DocumentStore, Snapshot, Value};
use crate::error::StoreError;

const DOC_PREFIX: &str = "DOC#";

/// Collections stored in one DynamoDB table.
///
/// Every document of a collection shares `PK = COLLECTION#<name>`, and its id
/// lives in `SK = DOC#<uuid>`. Timestamps are stored as `N` holding Unix epoch
/// microseconds, string lists as `L` of `S`.
#[derive(Debug, Clone)]
pub struct DynamoDocumentStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoDocumentStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn partition_key(collection: &str) -> String {
    format!("COLLECTION#{}", collection)
}

fn is_key_attribute(name: &str) -> bool {
    name == "PK" || name == "SK"
}

fn encode_value(value: Value, now: DateTime<Utc>) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::S(s),
        Value::StringList(list) => AttributeValue::L(list.into_iter().map(AttributeValue::S).collect()),
        Value::Timestamp(ts) => AttributeValue::N(ts.timestamp_micros().to_string()),
        Value::ServerTimestamp => AttributeValue::N(now.timestamp_micros().to_string()),
    }
}

/// Attributes of any other DynamoDB type are not part of the document model
/// and decode to `None`.
fn decode_value(value: &AttributeValue) -> Option<Value> {
    match value {
        AttributeValue::S(s) => Some(Value::String(s.clone())),
        AttributeValue::N(n) => n
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_micros)
            .map(Value::Timestamp),
        AttributeValue::L(list) => list
            .iter()
            .map(|v| v.as_s().ok().cloned())
            .collect::<Option<Vec<String>>>()
            .map(Value::StringList),
        _ => None,
    }
}

fn item_to_snapshot(item: &HashMap<String, AttributeValue>) -> Option<Snapshot> {
    let id = item
        .get("SK")
        .and_then(|v| v.as_s().ok())
        .and_then(|sk| sk.strip_prefix(DOC_PREFIX))?
        .to_string();

    let fields = item
        .iter()
        .filter(|(name, _)| !is_key_attribute(name))
        .filter_map(|(name, value)| match decode_value(value) {
            Some(v) => Some((name.clone(), v)),
            None => {
                tracing::warn!("⚠️ dropping undecodable attribute {} on document {}: {:?}", name, id, value);
                None
            }
        })
        .collect();

    Some(Snapshot { id, fields })
}

#[async_trait]
impl DocumentStore for DynamoDocumentStore {
    async fn add_document(&self, collection: &str, fields: Document) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        // Never overwrite: a fresh id must land on an empty key.
        let mut builder = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(partition_key(collection)))
            .item("SK", AttributeValue::S(format!("{}{}", DOC_PREFIX, id)))
            .condition_expression("attribute_not_exists(PK)");

        for (name, value) in fields {
            if is_key_attribute(&name) {
                tracing::warn!("⚠️ skipping reserved attribute {} in collection {}", name, collection);
                continue;
            }
            builder = builder.item(name, encode_value(value, now));
        }

        builder
            .send()
            .await
            .map_err(|e| StoreError::remote("DynamoDB put_item", e))?;

        Ok(id)
    }

    async fn query_ordered(
        &self,
        collection: &str,
        order_by: &str,
        direction: Direction,
    ) -> Result<Vec<Snapshot>, StoreError> {
        let items: Result<Vec<_>, _> = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
            .expression_attribute_values(":pk", AttributeValue::S(partition_key(collection)))
            .expression_attribute_values(":sk_prefix", AttributeValue::S(DOC_PREFIX.to_string()))
            .into_paginator()
            .items()
            .send()
            .collect()
            .await;

        let items = items.map_err(|e| StoreError::remote("DynamoDB query", e))?;

        let snapshots: Vec<Snapshot> = items.iter().filter_map(item_to_snapshot).collect();

        Ok(order_snapshots(snapshots, order_by, direction))
    }
}
