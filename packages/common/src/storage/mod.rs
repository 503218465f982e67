mod error;
mod key;
mod traits;

pub mod filesystem;
pub mod memory;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use key::BlobKey;
pub use traits::BlobStore;

use crate::config::{StorageBackend, StorageConfig};
use filesystem::FilesystemBlobStore;
use memory::InMemoryBlobStore;

/// Build the blob store selected by `config.backend`.
pub async fn open_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = FilesystemBlobStore::new(config.root.clone(), config.max_blob_size).await?;
            tracing::info!(root = %config.root.display(), "Using filesystem blob store");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory blob store; contents are lost on restart");
            Ok(Arc::new(InMemoryBlobStore::new(config.max_blob_size)))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StorageError::Config("storage.s3 section is required for the s3 backend".into())
            })?;
            let store = s3::S3BlobStore::new(s3_config, config.max_blob_size)?;
            tracing::info!(bucket = %s3_config.bucket, "Using S3 blob store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Config(
            "s3 backend requires the object-storage feature".into(),
        )),
    }
}
