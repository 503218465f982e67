use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{FileError, FileScope, FileStores};

/// Deletes files blob-first, verifying the blob is gone before the record is
/// removed. Any doubt about the blob keeps the record in place.
#[derive(Clone)]
pub struct DeleteCoordinator {
    stores: FileStores,
}

impl DeleteCoordinator {
    pub fn new(stores: FileStores) -> Self {
        Self { stores }
    }

    #[instrument(skip(self), fields(tenant_id = %scope.tenant_id, owner_id = %scope.owner_id))]
    pub async fn delete(&self, scope: &FileScope, id: Uuid) -> Result<(), FileError> {
        let record = self.stores.find_scoped(scope, id).await?;

        self.stores
            .blobs
            .delete(&record.blob_key)
            .await
            .map_err(FileError::BlobStoreUnavailable)?;

        match self.stores.blobs.exists(&record.blob_key).await {
            Ok(false) => {}
            Ok(true) => {
                error!(
                    file_id = %id,
                    blob_key = %record.blob_key,
                    "Blob still present after delete; keeping record"
                );
                return Err(FileError::Inconsistent {
                    blob_key: record.blob_key,
                });
            }
            Err(err) => {
                error!(
                    file_id = %id,
                    blob_key = %record.blob_key,
                    error = %err,
                    "Could not verify blob deletion; keeping record"
                );
                return Err(FileError::VerificationIndeterminate(err));
            }
        }

        self.stores
            .metadata
            .delete_by_id(id)
            .await
            .map_err(FileError::from_metadata)?;

        info!(file_id = %id, blob_key = %record.blob_key, "File deleted");
        Ok(())
    }
}
