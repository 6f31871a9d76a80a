//! S3 (or S3-compatible) backend.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use crate::{ObjectStore, StorageError, Visibility};

/// Default region when `AWS_REGION` is not set.
const DEFAULT_REGION: &str = "us-east-1";

/// Default lifetime of presigned download URLs (24 hours).
const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 24 * 60 * 60;

/// Connection settings for the object store.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Custom endpoint (MinIO, LocalStack). Path-style addressing is used when set.
    pub endpoint: Option<String>,
    /// Private bucket, read through presigned URLs.
    pub bucket: String,
    /// World-readable bucket.
    pub public_bucket: String,
    pub presign_expiry_secs: u64,
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                       | Required | Default     |
    /// |-------------------------------|----------|-------------|
    /// | `AWS_ACCESS_KEY`              | **yes**  | --          |
    /// | `AWS_SECRET_KEY`              | **yes**  | --          |
    /// | `AWS_REGION`                  | no       | `us-east-1` |
    /// | `AWS_S3_ENDPOINT`             | no       | --          |
    /// | `AWS_S3_BUCKET_NAME`          | **yes**  | --          |
    /// | `AWS_S3_PUBLIC_BUCKET_NAME`   | **yes**  | --          |
    /// | `AWS_S3_PRESIGN_EXPIRY_SECS`  | no       | `86400`     |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Self {
        let required = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"))
        };

        Self {
            access_key: required("AWS_ACCESS_KEY"),
            secret_key: required("AWS_SECRET_KEY"),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            endpoint: std::env::var("AWS_S3_ENDPOINT")
                .ok()
                .filter(|s| !s.is_empty()),
            bucket: required("AWS_S3_BUCKET_NAME"),
            public_bucket: required("AWS_S3_PUBLIC_BUCKET_NAME"),
            presign_expiry_secs: std::env::var("AWS_S3_PRESIGN_EXPIRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PRESIGN_EXPIRY_SECS),
        }
    }
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_bucket: String,
    presign_expiry: Duration,
}

impl S3Storage {
    /// Build a client with static credentials from `config`.
    pub async fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "bookshelf-static",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        tracing::info!(
            region = %config.region,
            bucket = %config.bucket,
            public_bucket = %config.public_bucket,
            "S3 client configured"
        );

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_bucket: config.public_bucket.clone(),
            presign_expiry: Duration::from_secs(config.presign_expiry_secs),
        }
    }

    fn bucket_for(&self, visibility: Visibility) -> &str {
        match visibility {
            Visibility::Public => &self.public_bucket,
            Visibility::Private => &self.bucket,
        }
    }
}

fn request_error<E>(operation: &'static str, key: &str, err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::Request {
        operation,
        key: key.to_string(),
        message: DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_object(
        &self,
        visibility: Visibility,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = body.len();
        let mut request = self
            .client
            .put_object()
            .bucket(self.bucket_for(visibility))
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type);
        if visibility == Visibility::Public {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }
        request
            .send()
            .await
            .map_err(|e| request_error("put", key, e))?;

        tracing::debug!(key, size, ?visibility, "Object uploaded");
        Ok(())
    }

    async fn delete_object(&self, visibility: Visibility, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(self.bucket_for(visibility))
            .key(key)
            .send()
            .await
            .map_err(|e| request_error("delete", key, e))?;

        tracing::debug!(key, ?visibility, "Object deleted");
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> Result<String, StorageError> {
        let presign = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| StorageError::Presign(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign)
            .await
            .map_err(|e| request_error("presign", key, e))?;
        Ok(request.uri().to_string())
    }
}
