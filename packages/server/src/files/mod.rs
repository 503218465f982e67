//! File persistence coordination.
//!
//! A file lives in two independent stores: its bytes in a [`BlobStore`] and its
//! searchable record in a [`MetadataStore`]. The coordinators here order their
//! calls so that a live record always points at an existing blob. The only
//! tolerated inconsistency is an orphan blob that no record references.

mod delete;
mod error;
mod key;
mod replace;
mod upload;
mod usage;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use common::storage::{BlobKey, BlobStore};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::metadata::{FileRecord, MetadataStore};

pub use delete::DeleteCoordinator;
pub use error::FileError;
pub use replace::{ReplaceCoordinator, Replacement};
pub use upload::{NewUpload, UploadCoordinator};
pub use usage::{MonthlyCount, UsageAggregator};

/// The (tenant, owner) pair a caller acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileScope {
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
}

impl FileScope {
    pub fn new(tenant_id: Uuid, owner_id: Uuid) -> Self {
        Self {
            tenant_id,
            owner_id,
        }
    }

    pub fn owns(&self, record: &FileRecord) -> bool {
        record.tenant_id == self.tenant_id && record.owner_id == self.owner_id
    }
}

/// Handles to both stores, shared by every coordinator.
#[derive(Clone)]
pub struct FileStores {
    pub blobs: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn MetadataStore>,
}

impl FileStores {
    pub fn new(blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { blobs, metadata }
    }

    /// Load a record, reporting records outside `scope` as missing.
    pub(crate) async fn find_scoped(
        &self,
        scope: &FileScope,
        id: Uuid,
    ) -> Result<FileRecord, FileError> {
        let record = self
            .metadata
            .find_by_id(id)
            .await
            .map_err(FileError::from_metadata)?;

        if !scope.owns(&record) {
            return Err(FileError::NotFound);
        }
        Ok(record)
    }

    /// Best-effort delete of a blob no record points at. Attempted once.
    pub(crate) async fn discard_blob(&self, key: &BlobKey, reason: &str) {
        match self.blobs.delete(key).await {
            Ok(()) => info!(blob_key = %key, reason, "Discarded unreferenced blob"),
            Err(err) => warn!(
                blob_key = %key,
                reason,
                error = %err,
                "Failed to discard blob; leaving orphan"
            ),
        }
    }
}

/// Hex SHA-256 of the content.
pub(crate) fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub(crate) fn guess_content_type(name: &str) -> Option<String> {
    mime_guess::from_path(name).first().map(|m| m.to_string())
}

/// Entry point used by the HTTP layer: one coordinator per operation.
#[derive(Clone)]
pub struct FileService {
    stores: FileStores,
    upload: UploadCoordinator,
    replace: ReplaceCoordinator,
    delete: DeleteCoordinator,
    usage: UsageAggregator,
}

impl FileService {
    pub fn new(blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        let stores = FileStores::new(blobs, metadata);
        Self {
            upload: UploadCoordinator::new(stores.clone()),
            replace: ReplaceCoordinator::new(stores.clone()),
            delete: DeleteCoordinator::new(stores.clone()),
            usage: UsageAggregator::new(stores.clone()),
            stores,
        }
    }

    pub async fn create(&self, scope: &FileScope, upload: NewUpload) -> Result<FileRecord, FileError> {
        self.upload.create(scope, upload).await
    }

    /// All files in the scope, oldest first.
    pub async fn list(&self, scope: &FileScope) -> Result<Vec<FileRecord>, FileError> {
        self.stores
            .metadata
            .find_by_scope(scope.tenant_id, scope.owner_id)
            .await
            .map_err(FileError::MetadataStoreUnavailable)
    }

    pub async fn replace(
        &self,
        scope: &FileScope,
        id: Uuid,
        replacement: Replacement,
    ) -> Result<FileRecord, FileError> {
        self.replace.replace(scope, id, replacement).await
    }

    pub async fn delete(&self, scope: &FileScope, id: Uuid) -> Result<(), FileError> {
        self.delete.delete(scope, id).await
    }

    pub async fn monthly_counts(&self, scope: &FileScope) -> Result<Vec<MonthlyCount>, FileError> {
        self.usage.monthly_counts(scope).await
    }
}
