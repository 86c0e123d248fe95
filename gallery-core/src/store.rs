use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::StorageError;

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// An object fetched from the bucket.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    /// Content type recorded by the provider, if any.
    pub content_type: Option<String>,
}

/// The object-storage operations the gallery depends on.
///
/// Every component receives an implementation of this trait at construction
/// time instead of reaching for a shared client.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store operates on.
    fn bucket(&self) -> &str;

    /// Check that the bucket exists.
    ///
    /// Returns [`StorageError::BucketNotFound`] when the provider reports it missing.
    async fn head_bucket(&self) -> Result<(), StorageError>;

    /// Create the bucket in `region`.
    async fn create_bucket(&self, region: &str) -> Result<(), StorageError>;

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    /// List every object in the bucket, in provider order.
    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, StorageError>;

    /// Cheapest possible live call against the bucket (a one-key listing).
    async fn probe(&self) -> Result<(), StorageError>;

    /// Fetch an object by exact key.
    ///
    /// Returns [`StorageError::NotFound`] when the key does not exist.
    async fn get_object(&self, key: &str) -> Result<StoredObject, StorageError>;
}

/// Handle to the configured store, or the reason it could not be built.
///
/// Construction failures do not stop the process: the handle stays
/// unavailable and every operation reports [`StorageError::Unavailable`].
#[derive(Clone)]
pub struct Storage {
    inner: Result<Arc<dyn ObjectStore>, Arc<str>>,
}

impl Storage {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { inner: Ok(store) }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            inner: Err(Arc::from(reason.into())),
        }
    }

    pub fn client(&self) -> Result<&dyn ObjectStore, StorageError> {
        match &self.inner {
            Ok(store) => Ok(store.as_ref()),
            Err(reason) => Err(StorageError::Unavailable(reason.to_string())),
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Ok(store) => f.debug_struct("Storage").field("bucket", &store.bucket()).finish(),
            Err(reason) => f.debug_struct("Storage").field("unavailable", reason).finish(),
        }
    }
}
