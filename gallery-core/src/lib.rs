pub mod bootstrap;
pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
pub mod proxy;
pub mod s3;
pub mod store;
pub mod upload;
pub mod validation;

pub use bootstrap::{ensure_bucket, BootstrapOutcome};
pub use config::StorageConfig;
pub use error::StorageError;
pub use listing::{GalleryImage, ListingService};
pub use memory::InMemoryStore;
pub use proxy::{ImageProxy, ProxiedImage, ProxyError};
pub use s3::S3Client;
pub use store::{ObjectStore, ObjectSummary, Storage, StoredObject};
pub use upload::{UploadError, UploadPipeline, UploadedFile, UploadedImage};
