use serde::Serialize;

use crate::store::{ObjectSummary, Storage};
use crate::upload::image_url;
use crate::validation::is_image_key;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One gallery tile, rebuilt from the bucket on every page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub last_modified: String,
}

impl From<ObjectSummary> for GalleryImage {
    fn from(object: ObjectSummary) -> Self {
        Self {
            url: image_url(&object.key),
            size: object.size,
            last_modified: object.last_modified.format(TIMESTAMP_FORMAT).to_string(),
            filename: object.key,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingService {
    storage: Storage,
}

impl ListingService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All displayable images, in provider order.
    ///
    /// Fails soft: any storage error is logged and yields an empty gallery.
    pub async fn list_images(&self) -> Vec<GalleryImage> {
        let store = match self.storage.client() {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Cannot list images: {}", e);
                return Vec::new();
            }
        };

        match store.list_objects().await {
            Ok(objects) => {
                let images: Vec<GalleryImage> = objects
                    .into_iter()
                    .filter(|object| is_image_key(&object.key))
                    .map(GalleryImage::from)
                    .collect();
                tracing::debug!("Listed {} images from bucket {}", images.len(), store.bucket());
                images
            }
            Err(e) => {
                tracing::error!("Error listing images in bucket {}: {}", store.bucket(), e);
                Vec::new()
            }
        }
    }
}
