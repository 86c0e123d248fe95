/// Region used when none is configured. Buckets in this region are created
/// without a location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

pub const DEFAULT_BUCKET: &str = "my-gallery-bucket";

/// Everything needed to build an [`S3Client`](crate::S3Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    pub endpoint_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
        }
    }
}

impl StorageConfig {
    /// Static credentials, when both halves are present.
    ///
    /// Returns an error message if only one of them is set.
    pub fn static_credentials(&self) -> Result<Option<(&str, &str)>, String> {
        match (non_empty(&self.access_key_id), non_empty(&self.secret_access_key)) {
            (Some(id), Some(secret)) => Ok(Some((id, secret))),
            (None, None) => Ok(None),
            (Some(_), None) => Err("AWS_SECRET_ACCESS_KEY is missing".to_string()),
            (None, Some(_)) => Err("AWS_ACCESS_KEY_ID is missing".to_string()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
