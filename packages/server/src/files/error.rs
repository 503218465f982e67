use common::storage::{BlobKey, StorageError};
use thiserror::Error;

use crate::metadata::MetadataError;

/// Failure of a file operation, as reported to the HTTP layer.
///
/// Compensation failures never appear here; they are logged and the original
/// failure is returned.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("file not found")]
    NotFound,

    #[error("blob store unavailable: {0}")]
    BlobStoreUnavailable(#[source] StorageError),

    #[error("metadata store unavailable: {0}")]
    MetadataStoreUnavailable(#[source] MetadataError),

    /// The post-delete existence check itself failed.
    #[error("could not verify blob deletion: {0}")]
    VerificationIndeterminate(#[source] StorageError),

    /// The blob is still present after a delete that reported success.
    #[error("blob {blob_key} still present after delete")]
    Inconsistent { blob_key: BlobKey },
}

impl FileError {
    /// Classify a failed blob write.
    pub(crate) fn from_put(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { actual, limit } => Self::InvalidInput(format!(
                "File exceeds maximum size of {limit} bytes ({actual} bytes)"
            )),
            other => Self::BlobStoreUnavailable(other),
        }
    }

    /// Classify a failed metadata call.
    pub(crate) fn from_metadata(err: MetadataError) -> Self {
        match err {
            MetadataError::NotFound(_) => Self::NotFound,
            other => Self::MetadataStoreUnavailable(other),
        }
    }
}
