use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::{FilePatch, FileRecord, MetadataError, MetadataStore, NewFileRecord};
use crate::entity::file_record;

/// Metadata store over a SQL database via sea-orm.
#[derive(Clone)]
pub struct SeaOrmMetadataStore {
    db: DatabaseConnection,
}

impl SeaOrmMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn classify(err: DbErr) -> MetadataError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return MetadataError::Conflict(detail);
    }
    MetadataError::Database(err)
}

#[async_trait]
impl MetadataStore for SeaOrmMetadataStore {
    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord, MetadataError> {
        let model = file_record::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(record.tenant_id),
            owner_id: Set(record.owner_id),
            name: Set(record.name),
            blob_key: Set(record.blob_key.into_string()),
            location: Set(record.location),
            content_type: Set(record.content_type),
            size: Set(record.size),
            content_hash: Set(record.content_hash),
            created_at: Set(record.created_at),
            updated_at: Set(record.created_at),
        };

        let saved = model.insert(&self.db).await.map_err(classify)?;
        saved.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<FileRecord, MetadataError> {
        file_record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(MetadataError::NotFound(id))?
            .try_into()
    }

    async fn find_by_scope(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<FileRecord>, MetadataError> {
        file_record::Entity::find()
            .filter(file_record::Column::TenantId.eq(tenant_id))
            .filter(file_record::Column::OwnerId.eq(owner_id))
            .order_by_asc(file_record::Column::CreatedAt)
            .order_by_asc(file_record::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(FileRecord::try_from)
            .collect()
    }

    async fn update_by_id(&self, id: Uuid, patch: FilePatch) -> Result<FileRecord, MetadataError> {
        // Only `Set` columns are written, as a single UPDATE by primary key.
        let mut active = file_record::ActiveModel {
            id: ActiveValue::Unchanged(id),
            ..Default::default()
        };

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(content) = patch.content {
            active.blob_key = Set(content.blob_key.into_string());
            active.location = Set(content.location);
            active.content_type = Set(content.content_type);
            active.size = Set(content.size);
            active.content_hash = Set(content.content_hash);
        }
        active.updated_at = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(model) => model.try_into(),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => {
                Err(MetadataError::NotFound(id))
            }
            Err(e) => Err(classify(e)),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), MetadataError> {
        let result = file_record::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(MetadataError::NotFound(id));
        }
        Ok(())
    }
}
