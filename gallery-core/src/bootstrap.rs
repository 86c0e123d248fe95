use crate::error::StorageError;
use crate::store::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Exists,
    Created,
    /// The bucket could not be verified or created. The process keeps running.
    Failed(String),
}

/// Make sure the configured bucket exists, creating it in `region` if the
/// provider reports it missing. Never fatal.
pub async fn ensure_bucket(storage: &Storage, region: &str) -> BootstrapOutcome {
    let store = match storage.client() {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Skipping bucket bootstrap: {}", e);
            return BootstrapOutcome::Failed(e.to_string());
        }
    };

    match store.head_bucket().await {
        Ok(()) => {
            tracing::info!("Bucket {} exists", store.bucket());
            BootstrapOutcome::Exists
        }
        Err(StorageError::BucketNotFound(_)) => match store.create_bucket(region).await {
            Ok(()) => {
                tracing::info!("Created bucket {} in {}", store.bucket(), region);
                BootstrapOutcome::Created
            }
            Err(e) => {
                tracing::error!("Error creating bucket {}: {}", store.bucket(), e);
                BootstrapOutcome::Failed(e.to_string())
            }
        },
        Err(e) => {
            tracing::error!("Error checking bucket {}: {}", store.bucket(), e);
            BootstrapOutcome::Failed(e.to_string())
        }
    }
}
