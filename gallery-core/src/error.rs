use thiserror::Error;

/// Errors reported by an [`ObjectStore`](crate::ObjectStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The client could not be constructed from the configuration.
    #[error("S3 client unavailable: {0}")]
    Unavailable(String),

    /// The requested key does not exist in the bucket.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The configured bucket does not exist.
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Any other provider-level failure, carrying the provider's message.
    #[error("{0}")]
    Provider(String),
}
