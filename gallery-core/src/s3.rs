use std::future::Future;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    error::DisplayErrorContext,
    operation::list_objects_v2::ListObjectsV2Output,
    primitives::{ByteStream, DateTime},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use bytes::Bytes;
use chrono::Utc;

use crate::config::{StorageConfig, DEFAULT_REGION};
use crate::error::StorageError;
use crate::store::{ObjectStore, ObjectSummary, StoredObject};

#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Unavailable("bucket name is empty".to_string()));
        }
        let credentials = config
            .static_credentials()
            .map_err(StorageError::Unavailable)?;

        let mut config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some((access_key_id, secret_access_key)) = credentials {
            config_loader = config_loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "gallery-config",
            ));
        }

        // Custom endpoint for MinIO/LocalStack/etc
        if let Some(endpoint_url) = &config.endpoint_url {
            config_loader = config_loader.endpoint_url(endpoint_url);
        }

        let sdk_config = config_loader.load().await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        // For S3-compatible services, force path-style addressing
        if config.endpoint_url.is_some() {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        tracing::info!(
            "S3 client ready: bucket={}, region={}, endpoint={:?}",
            config.bucket,
            config.region,
            config.endpoint_url
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn head_bucket(&self) -> Result<(), StorageError> {
        tracing::debug!("S3 HEAD bucket: bucket={}", self.bucket);

        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().is_some_and(|e| e.is_not_found()) => {
                Err(StorageError::BucketNotFound(self.bucket.clone()))
            }
            Err(e) => Err(provider_error(e)),
        }
    }

    async fn create_bucket(&self, region: &str) -> Result<(), StorageError> {
        tracing::debug!("S3 CREATE bucket: bucket={}, region={}", self.bucket, region);

        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .set_create_bucket_configuration(bucket_configuration(region))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        tracing::debug!(
            "S3 PUT (bytes): bucket={}, key={}, size={} bytes",
            self.bucket,
            key,
            data.len()
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(provider_error)?;

        tracing::debug!("S3 PUT (bytes) success: key={}", key);
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, StorageError> {
        let objects = collect_pages(|continuation_token| {
            tracing::debug!(
                "S3 LIST: bucket={}, continuation={:?}",
                self.bucket,
                continuation_token
            );
            let request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation_token);
            async move { request.send().await.map_err(provider_error) }
        })
        .await?;

        tracing::debug!("S3 LIST success: {} objects", objects.len());
        Ok(objects)
    }

    async fn probe(&self) -> Result<(), StorageError> {
        self.client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<StoredObject, StorageError> {
        tracing::debug!("S3 GET: bucket={}, key={}", self.bucket, key);

        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(provider_error(e)),
        };

        let content_type = response.content_type().map(str::to_string);
        let data = response
            .body
            .collect()
            .await
            .map_err(provider_error)?
            .into_bytes();

        tracing::debug!("S3 GET success: key={}, size={} bytes", key, data.len());
        Ok(StoredObject { data, content_type })
    }
}

/// The default region rejects an explicit location constraint, every other
/// region requires one.
fn bucket_configuration(region: &str) -> Option<CreateBucketConfiguration> {
    if region.is_empty() || region == DEFAULT_REGION {
        return None;
    }
    Some(
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build(),
    )
}

fn to_chrono(timestamp: &DateTime) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
        .unwrap_or_default()
}

/// Drain a paginated listing. `fetch` receives the continuation token of the
/// previous page; paging stops once a page is not truncated or has no token.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<ObjectSummary>, StorageError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListObjectsV2Output, StorageError>>,
{
    let mut objects = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let page = fetch(continuation_token.take()).await?;

        for object in page.contents() {
            let Some(key) = object.key() else {
                continue;
            };
            objects.push(ObjectSummary {
                key: key.to_string(),
                size: object.size().unwrap_or_default().max(0) as u64,
                last_modified: object.last_modified().map(to_chrono).unwrap_or_default(),
            });
        }

        match page.next_continuation_token() {
            Some(token) if page.is_truncated().unwrap_or(false) => {
                continuation_token = Some(token.to_string());
            }
            _ => return Ok(objects),
        }
    }
}

fn provider_error<E>(err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::Provider(DisplayErrorContext(err).to_string())
}
