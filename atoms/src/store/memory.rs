use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{order_snapshots, resolve_server_timestamps, Direction, Document, DocumentStore, Snapshot};
use crate::error::StoreError;

/// Process-local document store.
///
/// Useful for tests and local runs without AWS. Timestamps are taken under the
/// write lock, so insertion order and `ServerTimestamp` values never disagree.
/// Writes and reads can be made to fail to simulate an unreachable remote.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Snapshot>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add_document(&self, collection: &str, fields: Document) -> Result<String, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::remote(
                "memory add_document",
                std::io::Error::other("store unavailable"),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut collections = self.collections.write().await;
        let fields = resolve_server_timestamps(fields, Utc::now());

        collections
            .entry(collection.to_string())
            .or_default()
            .push(Snapshot { id: id.clone(), fields });

        Ok(id)
    }

    async fn query_ordered(
        &self,
        collection: &str,
        order_by: &str,
        direction: Direction,
    ) -> Result<Vec<Snapshot>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::remote(
                "memory query",
                std::io::Error::other("store unavailable"),
            ));
        }

        let snapshots = self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();

        Ok(order_snapshots(snapshots, order_by, direction))
    }
}
