use bytes::Bytes;
use thiserror::Error;

use crate::error::StorageError;
use crate::store::Storage;

/// Content type assumed when the provider did not record one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Cache policy attached to every proxied image.
pub const CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Clone)]
pub struct ProxiedImage {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProxyError {
    #[error("Image not found")]
    NotFound,

    #[error("S3 client error")]
    Unavailable,

    #[error("Server error")]
    Failed(String),
}

impl From<StorageError> for ProxyError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => Self::NotFound,
            StorageError::Unavailable(_) => Self::Unavailable,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Re-serves bucket objects through the application.
#[derive(Debug, Clone)]
pub struct ImageProxy {
    storage: Storage,
}

impl ImageProxy {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Single best-effort fetch of `key`; never retried.
    pub async fn fetch(&self, key: &str) -> Result<ProxiedImage, ProxyError> {
        let store = self.storage.client()?;
        let object = store.get_object(key).await?;

        Ok(ProxiedImage {
            data: object.data,
            content_type: object
                .content_type
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        })
    }
}
