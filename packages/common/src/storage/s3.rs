use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::key::BlobKey;
use super::traits::BlobStore;
use crate::config::S3StorageConfig;

/// Blob store backed by an S3-compatible bucket.
///
/// The client is built without `fail-on-err`, so non-2xx responses come back
/// as `Ok` and are classified here by status code.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    max_size: u64,
}

impl S3BlobStore {
    pub fn new(config: &S3StorageConfig, max_size: u64) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.region.parse::<Region>().map_err(|e| {
                StorageError::Config(format!("invalid region '{}': {e}", config.region))
            })?,
        };

        let credentials = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => Credentials::new(
                Some(access_key.as_str()),
                Some(secret_key.as_str()),
                None,
                None,
                None,
            ),
            _ => Credentials::default(),
        }
        .map_err(|e| StorageError::Config(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(format!("invalid S3 bucket: {e}")))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket, max_size })
    }

    fn location(&self, key: &BlobKey) -> String {
        format!("{}/{}", self.bucket.url(), key)
    }
}

fn backend_error(op: &str, err: S3Error) -> StorageError {
    StorageError::Backend(format!("{op} failed: {err}"))
}

fn unexpected_status(op: &str, status: u16) -> StorageError {
    StorageError::Backend(format!("{op} returned HTTP {status}"))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object(key.as_str(), data)
            .await
            .map_err(|e| backend_error("PutObject", e))?;

        match response.status_code() {
            status if is_success(status) => Ok(self.location(key)),
            status => Err(unexpected_status("PutObject", status)),
        }
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        let response = match self.bucket.get_object(key.as_str()).await {
            Ok(response) => response,
            Err(S3Error::HttpFailWithBody(404, _)) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(backend_error("GetObject", e)),
        };

        match response.status_code() {
            status if is_success(status) => Ok(response.bytes().to_vec()),
            404 => Err(StorageError::NotFound(key.to_string())),
            status => Err(unexpected_status("GetObject", status)),
        }
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        match self.bucket.head_object(key.as_str()).await {
            Ok((_, status)) if is_success(status) => Ok(true),
            Ok((_, 404)) | Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Ok((_, status)) => Err(unexpected_status("HeadObject", status)),
            Err(e) => Err(backend_error("HeadObject", e)),
        }
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), StorageError> {
        let status = match self.bucket.delete_object(key.as_str()).await {
            Ok(response) => response.status_code(),
            Err(S3Error::HttpFailWithBody(404, _)) => return Ok(()),
            Err(e) => return Err(backend_error("DeleteObject", e)),
        };

        if is_success(status) || status == 404 {
            Ok(())
        } else {
            Err(unexpected_status("DeleteObject", status))
        }
    }
}
