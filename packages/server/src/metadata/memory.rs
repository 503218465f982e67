use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FilePatch, FileRecord, MetadataError, MetadataStore, NewFileRecord};

/// Process-local metadata store for development and tests.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    records: RwLock<HashMap<Uuid, FileRecord>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, in no particular order.
    pub async fn all(&self) -> Vec<FileRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord, MetadataError> {
        let mut records = self.records.write().await;
        if records.values().any(|r| r.blob_key == record.blob_key) {
            return Err(MetadataError::Conflict(format!(
                "blob key already referenced: {}",
                record.blob_key
            )));
        }

        let saved = FileRecord {
            id: Uuid::now_v7(),
            tenant_id: record.tenant_id,
            owner_id: record.owner_id,
            name: record.name,
            blob_key: record.blob_key,
            location: record.location,
            content_type: record.content_type,
            size: record.size,
            content_hash: record.content_hash,
            created_at: record.created_at,
            updated_at: record.created_at,
        };
        records.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<FileRecord, MetadataError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(MetadataError::NotFound(id))
    }

    async fn find_by_scope(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<FileRecord>, MetadataError> {
        let mut matching: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.owner_id == owner_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn update_by_id(&self, id: Uuid, patch: FilePatch) -> Result<FileRecord, MetadataError> {
        let mut records = self.records.write().await;

        if let Some(content) = &patch.content
            && records
                .values()
                .any(|r| r.id != id && r.blob_key == content.blob_key)
        {
            return Err(MetadataError::Conflict(format!(
                "blob key already referenced: {}",
                content.blob_key
            )));
        }

        let record = records.get_mut(&id).ok_or(MetadataError::NotFound(id))?;
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(content) = patch.content {
            record.blob_key = content.blob_key;
            record.location = content.location;
            record.content_type = content.content_type;
            record.size = content.size;
            record.content_hash = content.content_hash;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), MetadataError> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(MetadataError::NotFound(id))
    }
}
