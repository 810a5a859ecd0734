use std::fmt;
use std::sync::Arc;

use super::model::{fields, ImageRecord, NewImageRecord};
use crate::error::StoreError;
use crate::store::{Direction, DocumentStore};

/// Collection that holds image metadata unless configured otherwise.
pub const IMAGES_COLLECTION: &str = "images";

/// The only path between callers and the store for image metadata.
///
/// Holds no state of its own beyond the shared store handle, so clones are
/// cheap and calls may run concurrently without coordination.
#[derive(Clone)]
pub struct MetadataGateway {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl fmt::Debug for MetadataGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataGateway")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl MetadataGateway {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Gateway over the default `images` collection.
    pub fn images(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, IMAGES_COLLECTION)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Store metadata for an image the upload service has already accepted.
    ///
    /// The upload time is assigned by the store. Required strings are written
    /// as given, empty or not. Returns the new record's id.
    pub async fn store(&self, image: NewImageRecord) -> Result<String, StoreError> {
        let file_name = image.file_name.clone();

        match self.store.add_document(&self.collection, image.into_document()).await {
            Ok(id) => {
                tracing::info!(
                    "✅ stored image metadata: collection={}, id={}, file_name={}",
                    self.collection,
                    id,
                    file_name
                );
                Ok(id)
            }
            Err(e) => {
                tracing::error!(
                    operation = "store",
                    collection = %self.collection,
                    details = ?e,
                    "❌ error storing image metadata: {}",
                    e
                );
                Err(e)
            }
        }
    }

    /// All records, newest upload first. Empty collection gives an empty list.
    pub async fn list_all(&self) -> Result<Vec<ImageRecord>, StoreError> {
        match self.load_all().await {
            Ok(images) => {
                tracing::debug!(
                    "📦 loaded image metadata: collection={}, count={}",
                    self.collection,
                    images.len()
                );
                Ok(images)
            }
            Err(e) => {
                tracing::error!(
                    operation = "list_all",
                    collection = %self.collection,
                    details = ?e,
                    "❌ error getting image metadata: {}",
                    e
                );
                Err(e)
            }
        }
    }

    async fn load_all(&self) -> Result<Vec<ImageRecord>, StoreError> {
        let snapshots = self
            .store
            .query_ordered(&self.collection, fields::UPLOADED_AT, Direction::Descending)
            .await?;

        snapshots.iter().map(ImageRecord::from_snapshot).collect()
    }
}
