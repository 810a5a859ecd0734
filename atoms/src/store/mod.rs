//! Collection-oriented document store contract.
//!
//! A store holds named collections of flat documents. Writes are insert-only
//! appends with a store-assigned id; reads return a whole collection sorted by
//! a single field. Both adapters in this module (DynamoDB and in-memory) honor
//! the same contract so callers can swap one for the other.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoDocumentStore;
pub use memory::MemoryDocumentStore;

/// A single field value in a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    StringList(Vec<String>),
    Timestamp(DateTime<Utc>),
    /// Write-only placeholder; the store swaps in its own clock at write time.
    ServerTimestamp,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Value::StringList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Field name to value.
pub type Document = HashMap<String, Value>;

/// A document as read back from the store, keyed by its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub fields: Document,
}

impl Snapshot {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a new document to `collection` and return its id.
    ///
    /// Any [`Value::ServerTimestamp`] in `fields` is replaced by the store's
    /// time of write. On error nothing has been written.
    async fn add_document(&self, collection: &str, fields: Document) -> Result<String, StoreError>;

    /// Read every document in `collection` that has an `order_by` field,
    /// sorted on it.
    ///
    /// Documents without the field are left out, not failed. Either the whole
    /// result is returned or an error is.
    async fn query_ordered(
        &self,
        collection: &str,
        order_by: &str,
        direction: Direction,
    ) -> Result<Vec<Snapshot>, StoreError>;
}

pub(crate) fn resolve_server_timestamps(fields: Document, now: DateTime<Utc>) -> Document {
    fields
        .into_iter()
        .map(|(name, value)| match value {
            Value::ServerTimestamp => (name, Value::Timestamp(now)),
            other => (name, other),
        })
        .collect()
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Timestamp(_) => 0,
        Value::String(_) => 1,
        Value::StringList(_) => 2,
        Value::ServerTimestamp => 3,
    }
}

/// Total order over values: by type first, then by content within a type.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::StringList(a), Value::StringList(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Drop documents without `order_by`, then stable-sort the rest so equal keys
/// keep the order the store gave them.
pub(crate) fn order_snapshots(
    snapshots: Vec<Snapshot>,
    order_by: &str,
    direction: Direction,
) -> Vec<Snapshot> {
    let mut ordered: Vec<Snapshot> = snapshots
        .into_iter()
        .filter(|snapshot| snapshot.get(order_by).is_some())
        .collect();

    ordered.sort_by(|a, b| match (a.get(order_by), b.get(order_by)) {
        (Some(a_value), Some(b_value)) => {
            let ordering = compare_values(a_value, b_value);
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        }
        _ => Ordering::Equal,
    });

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(id: &str, at: Option<i64>) -> Snapshot {
        let mut fields = Document::new();
        if let Some(secs) = at {
            let ts = Utc.timestamp_opt(secs, 0).single().unwrap();
            fields.insert("uploadedAt".to_string(), Value::Timestamp(ts));
        }
        Snapshot {
            id: id.to_string(),
            fields,
        }
    }

    fn ids(snapshots: &[Snapshot]) -> Vec<&str> {
        snapshots.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn documents_without_the_order_field_are_left_out() {
        let snapshots = vec![
            snapshot("old", Some(100)),
            snapshot("none", None),
            snapshot("new", Some(300)),
            snapshot("mid", Some(200)),
        ];

        let descending = order_snapshots(snapshots.clone(), "uploadedAt", Direction::Descending);
        assert_eq!(ids(&descending), ["new", "mid", "old"]);

        let ascending = order_snapshots(snapshots, "uploadedAt", Direction::Ascending);
        assert_eq!(ids(&ascending), ["old", "mid", "new"]);
    }

    #[test]
    fn equal_keys_keep_store_order() {
        let snapshots = vec![snapshot("a", Some(5)), snapshot("b", Some(5))];
        let ordered = order_snapshots(snapshots, "uploadedAt", Direction::Descending);
        assert_eq!(ids(&ordered), ["a", "b"]);
    }

    #[test]
    fn mixed_value_types_sort_without_panicking() {
        let snapshots: Vec<Snapshot> = (0..64)
            .map(|n| {
                let mut fields = Document::new();
                let value = if n % 3 == 0 {
                    Value::String(format!("2024-01-{:02}T00:00:00Z", n % 28 + 1))
                } else {
                    Value::Timestamp(Utc.timestamp_opt(1_700_000_000 + n, 0).single().unwrap())
                };
                fields.insert("uploadedAt".to_string(), value);
                Snapshot {
                    id: n.to_string(),
                    fields,
                }
            })
            .collect();

        let ordered = order_snapshots(snapshots, "uploadedAt", Direction::Descending);

        assert_eq!(ordered.len(), 64);
        // Strings rank above timestamps, so descending puts them first.
        let (strings, timestamps) = ordered.split_at(22);
        assert!(strings.iter().all(|s| s.get("uploadedAt").and_then(Value::as_str).is_some()));
        assert!(timestamps.iter().all(|s| s.get("uploadedAt").and_then(Value::as_timestamp).is_some()));
        for pair in timestamps.windows(2) {
            assert!(pair[0].get("uploadedAt").and_then(Value::as_timestamp)
                >= pair[1].get("uploadedAt").and_then(Value::as_timestamp));
        }
    }

    #[test]
    fn server_timestamp_placeholders_are_resolved() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let mut fields = Document::new();
        fields.insert("uploadedAt".to_string(), Value::ServerTimestamp);
        fields.insert("fileName".to_string(), Value::String("a.png".to_string()));

        let resolved = resolve_server_timestamps(fields, now);

        assert_eq!(resolved["uploadedAt"], Value::Timestamp(now));
        assert_eq!(resolved["fileName"].as_str(), Some("a.png"));
    }
}
