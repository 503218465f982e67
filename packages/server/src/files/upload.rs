use chrono::Utc;
use tracing::{error, info, instrument};

use super::key::generate_blob_key;
use super::{FileError, FileScope, FileStores, content_hash, guess_content_type};
use crate::metadata::{FileRecord, MetadataError, NewFileRecord};
use crate::utils::filename::validate_display_name;

/// Name and content for a new file.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Creates files: blob first, then the metadata record.
///
/// If the record cannot be written the blob is deleted again (once, best
/// effort). A failed compensation leaves an orphan blob, never a record
/// without a blob.
#[derive(Clone)]
pub struct UploadCoordinator {
    stores: FileStores,
}

impl UploadCoordinator {
    pub fn new(stores: FileStores) -> Self {
        Self { stores }
    }

    #[instrument(
        skip(self, upload),
        fields(tenant_id = %scope.tenant_id, owner_id = %scope.owner_id, size = upload.bytes.len())
    )]
    pub async fn create(&self, scope: &FileScope, upload: NewUpload) -> Result<FileRecord, FileError> {
        let name = validate_display_name(&upload.name)
            .map_err(|e| FileError::InvalidInput(e.message().into()))?
            .to_string();
        if upload.bytes.is_empty() {
            return Err(FileError::InvalidInput("No file data provided".into()));
        }

        let blob_key = generate_blob_key(scope, &name)?;
        let location = self
            .stores
            .blobs
            .put(&blob_key, &upload.bytes)
            .await
            .map_err(FileError::from_put)?;

        let record = NewFileRecord {
            tenant_id: scope.tenant_id,
            owner_id: scope.owner_id,
            content_type: guess_content_type(&name),
            size: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
            content_hash: content_hash(&upload.bytes),
            name,
            blob_key: blob_key.clone(),
            location,
            created_at: Utc::now(),
        };

        match self.stores.metadata.insert(record).await {
            Ok(saved) => {
                info!(file_id = %saved.id, blob_key = %saved.blob_key, "File created");
                Ok(saved)
            }
            Err(MetadataError::Conflict(detail)) => {
                // Another record already owns this key; deleting the blob would strand it.
                error!(blob_key = %blob_key, %detail, "Blob key collision on insert");
                Err(FileError::MetadataStoreUnavailable(MetadataError::Conflict(
                    detail,
                )))
            }
            Err(err) => {
                self.stores
                    .discard_blob(&blob_key, "metadata insert failed")
                    .await;
                Err(FileError::MetadataStoreUnavailable(err))
            }
        }
    }
}
