use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use uuid::Uuid;

use crate::error::StorageError;
use crate::store::Storage;
use crate::validation::{allowed_extension, content_type_for, secure_filename, MAX_FILE_SIZE};

/// A file received from a client, not yet validated.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Where an accepted upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub key: String,
    /// Application-relative URL served by the image proxy.
    pub url: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file selected")]
    NoFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("Invalid file type. Please upload PNG, JPG, JPEG, GIF, or WebP files.")]
    InvalidExtension,

    #[error("File too large. Maximum size is 16MB.")]
    TooLarge,

    #[error("Upload failed: S3 client initialization failed")]
    Unavailable,

    #[error("Upload failed: {0}")]
    Storage(String),

    #[error("Upload failed: Unexpected error: {0}")]
    Io(String),
}

impl UploadError {
    /// Rejections caused by the request itself rather than the system.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoFile | Self::EmptyFilename | Self::InvalidExtension | Self::TooLarge
        )
    }
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(_) => Self::Unavailable,
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Check a filename before any bytes are read.
///
/// Returns the lowercased extension.
pub fn validate_filename(filename: &str) -> Result<String, UploadError> {
    if filename.is_empty() {
        return Err(UploadError::EmptyFilename);
    }
    allowed_extension(filename).ok_or(UploadError::InvalidExtension)
}

pub fn validate_size(size: usize) -> Result<(), UploadError> {
    if size > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}

/// `<uuid>_<sanitized filename>`.
pub fn generate_key(filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), secure_filename(filename))
}

/// Characters left as-is inside one path segment of an image URL.
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Proxy URL for `key`. Each `/`-separated segment is percent-encoded so keys
/// containing `?`, `#` or `%` round-trip through the `/image/*key` route.
pub fn image_url(key: &str) -> String {
    let encoded = key
        .split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("/image/{encoded}")
}

/// Validates uploads and writes them to the bucket under fresh keys.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    storage: Storage,
}

impl UploadPipeline {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn upload(&self, file: UploadedFile) -> Result<UploadedImage, UploadError> {
        let extension = validate_filename(&file.filename)?;
        validate_size(file.data.len())?;

        let store = self.storage.client()?;
        let key = generate_key(&file.filename);
        let content_type = content_type_for(&extension);

        tracing::info!(
            "Uploading image: filename={}, key={}, size={} bytes",
            file.filename,
            key,
            file.data.len()
        );

        store.put_object(&key, file.data, &content_type).await?;

        let url = image_url(&key);
        Ok(UploadedImage { key, url })
    }
}
