use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::key::generate_blob_key;
use super::{FileError, FileScope, FileStores, content_hash, guess_content_type};
use crate::metadata::{ContentPatch, FilePatch, FileRecord, MetadataError};
use crate::utils::filename::validate_display_name;

/// Changes to apply to an existing file. Both fields absent is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Replacement {
    pub name: Option<String>,
    pub bytes: Option<Vec<u8>>,
}

/// Renames files and swaps their content.
///
/// New content goes to a fresh key. The record is repointed in one atomic
/// update, and only then is the superseded blob deleted. Until the update
/// lands the record keeps pointing at its original, still-present blob.
#[derive(Clone)]
pub struct ReplaceCoordinator {
    stores: FileStores,
}

impl ReplaceCoordinator {
    pub fn new(stores: FileStores) -> Self {
        Self { stores }
    }

    #[instrument(
        skip(self, replacement),
        fields(
            tenant_id = %scope.tenant_id,
            owner_id = %scope.owner_id,
            rename = replacement.name.is_some(),
            new_content = replacement.bytes.is_some(),
        )
    )]
    pub async fn replace(
        &self,
        scope: &FileScope,
        id: Uuid,
        replacement: Replacement,
    ) -> Result<FileRecord, FileError> {
        let existing = self.stores.find_scoped(scope, id).await?;

        let name = replacement
            .name
            .as_deref()
            .map(validate_display_name)
            .transpose()
            .map_err(|e| FileError::InvalidInput(e.message().into()))?
            .map(str::to_string);

        let Some(bytes) = replacement.bytes else {
            let Some(name) = name else {
                return Ok(existing);
            };
            let patch = FilePatch {
                name: Some(name),
                content: None,
            };
            let updated = self
                .stores
                .metadata
                .update_by_id(id, patch)
                .await
                .map_err(FileError::from_metadata)?;
            info!(file_id = %id, "File renamed");
            return Ok(updated);
        };

        if bytes.is_empty() {
            return Err(FileError::InvalidInput("No file data provided".into()));
        }

        let key_name = name.as_deref().unwrap_or(&existing.name);
        let new_key = generate_blob_key(scope, key_name)?;
        let location = self
            .stores
            .blobs
            .put(&new_key, &bytes)
            .await
            .map_err(FileError::from_put)?;

        let patch = FilePatch {
            content: Some(ContentPatch {
                blob_key: new_key.clone(),
                location,
                content_type: guess_content_type(key_name),
                size: i64::try_from(bytes.len()).unwrap_or(i64::MAX),
                content_hash: content_hash(&bytes),
            }),
            name,
        };

        let updated = match self.stores.metadata.update_by_id(id, patch).await {
            Ok(updated) => updated,
            Err(MetadataError::Conflict(detail)) => {
                // Another record already owns this key; deleting the blob would strand it.
                error!(blob_key = %new_key, %detail, "Blob key collision on update");
                return Err(FileError::MetadataStoreUnavailable(
                    MetadataError::Conflict(detail),
                ));
            }
            Err(err) => {
                self.stores
                    .discard_blob(&new_key, "metadata update failed")
                    .await;
                return Err(FileError::from_metadata(err));
            }
        };

        // The old blob is unreferenced now; failing to remove it only wastes storage.
        if let Err(err) = self.stores.blobs.delete(&existing.blob_key).await {
            warn!(
                blob_key = %existing.blob_key,
                error = %err,
                "Failed to delete superseded blob; leaving orphan"
            );
        }

        info!(file_id = %id, blob_key = %updated.blob_key, "File content replaced");
        Ok(updated)
    }
}
