use clap::Parser;
use gallery_core::config::{StorageConfig, DEFAULT_BUCKET, DEFAULT_REGION};

pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-change-this";

/// Runtime configuration, read once at startup from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "gallery-web")]
#[command(about = "Image gallery backed by an S3 bucket", long_about = None)]
pub struct Config {
    /// Access key id for static credentials
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    /// Secret access key for static credentials
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Region of the bucket
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Bucket holding the gallery
    #[arg(long, env = "S3_BUCKET_NAME", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Custom S3 endpoint (MinIO, LocalStack)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Secret used to sign flash-message cookies
    #[arg(long, env = "SECRET_KEY", default_value = DEFAULT_SECRET_KEY, hide_env_values = true)]
    pub secret_key: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Verbose logging and error details in error pages
    #[arg(long, env = "GALLERY_DEBUG")]
    pub debug: bool,
}

impl Config {
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }

    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "gallery_web=debug,gallery_core=debug,tower_http=debug"
        } else {
            "gallery_web=info,gallery_core=info,tower_http=info"
        }
    }
}
