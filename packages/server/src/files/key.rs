use chrono::Utc;
use common::storage::BlobKey;
use uuid::Uuid;

use super::{FileError, FileScope};
use crate::utils::filename::sanitize_key_segment;

/// Generate a fresh blob key: `{tenant}/{owner}/{millis}-{random}-{name}`.
///
/// The random component keeps keys distinct for identical names uploaded in
/// the same millisecond, so no two records ever share a key.
pub(crate) fn generate_blob_key(scope: &FileScope, name: &str) -> Result<BlobKey, FileError> {
    let leaf = format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_key_segment(name)
    );

    BlobKey::from_segments([
        scope.tenant_id.to_string(),
        scope.owner_id.to_string(),
        leaf,
    ])
    .map_err(|e| FileError::InvalidInput(e.to_string()))
}
