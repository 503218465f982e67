//! Metadata store capability: searchable file records scoped by tenant and owner.

mod memory;
mod sea_orm_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::storage::BlobKey;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::file_record;

pub use memory::InMemoryMetadataStore;
pub use sea_orm_store::SeaOrmMetadataStore;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("file record not found: {0}")]
    NotFound(Uuid),

    #[error("conflicting file record: {0}")]
    Conflict(String),

    #[error("corrupt file record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("metadata store unavailable: {0}")]
    Unavailable(String),
}

/// One logical file owned by a single (tenant, owner) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub blob_key: BlobKey,
    pub location: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record about to be inserted. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub blob_key: BlobKey,
    pub location: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields to change on an existing record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct FilePatch {
    pub name: Option<String>,
    pub content: Option<ContentPatch>,
}

/// Pointer to replacement content, written as one unit.
#[derive(Debug, Clone)]
pub struct ContentPatch {
    pub blob_key: BlobKey,
    pub location: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub content_hash: String,
}

/// Document-store capability consumed by the file coordinators.
///
/// `update_by_id` must apply the whole patch atomically; it is the only
/// serialization point between concurrent writers of the same record.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord, MetadataError>;

    async fn find_by_id(&self, id: Uuid) -> Result<FileRecord, MetadataError>;

    /// All records for the scope, oldest first.
    async fn find_by_scope(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<FileRecord>, MetadataError>;

    async fn update_by_id(&self, id: Uuid, patch: FilePatch) -> Result<FileRecord, MetadataError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), MetadataError>;
}

impl TryFrom<file_record::Model> for FileRecord {
    type Error = MetadataError;

    fn try_from(model: file_record::Model) -> Result<Self, Self::Error> {
        let blob_key = BlobKey::parse(&model.blob_key).map_err(|e| MetadataError::Corrupt {
            id: model.id,
            reason: e.to_string(),
        })?;

        Ok(Self {
            id: model.id,
            tenant_id: model.tenant_id,
            owner_id: model.owner_id,
            name: model.name,
            blob_key,
            location: model.location,
            content_type: model.content_type,
            size: model.size,
            content_hash: model.content_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
