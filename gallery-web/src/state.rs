use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use gallery_core::{ImageProxy, ListingService, ObjectStore, S3Client, Storage, UploadPipeline};
use sha2::{Digest, Sha512};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub uploads: UploadPipeline,
    pub listing: ListingService,
    pub proxy: ImageProxy,
    flash_key: Key,
}

impl AppState {
    /// Build the S3 client from `config`. A construction failure leaves the
    /// storage unavailable instead of aborting startup.
    pub async fn new(config: Config) -> Self {
        let storage = match S3Client::new(&config.storage()).await {
            Ok(client) => Storage::new(Arc::new(client)),
            Err(e) => {
                tracing::error!("Error initializing S3 client: {}", e);
                Storage::unavailable(e.to_string())
            }
        };

        Self::with_storage(config, storage)
    }

    pub fn with_store(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self::with_storage(config, Storage::new(store))
    }

    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let flash_key = derive_key(&config.secret_key);

        Self {
            uploads: UploadPipeline::new(storage.clone()),
            listing: ListingService::new(storage.clone()),
            proxy: ImageProxy::new(storage.clone()),
            storage,
            config: Arc::new(config),
            flash_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.flash_key.clone()
    }
}

/// Cookie signing needs 64 bytes of key material; stretch the configured
/// secret to that with SHA-512.
fn derive_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}
