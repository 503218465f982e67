use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_record")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    pub owner_id: Uuid,

    /// Display name shown to the owner.
    pub name: String,

    /// Locator of the current content in the blob store.
    #[sea_orm(unique)]
    pub blob_key: String,

    /// Location reported by the blob store at upload time. Display only.
    pub location: String,

    /// MIME content type.
    pub content_type: Option<String>,

    pub size: i64,

    /// Hex SHA-256 of the stored content.
    pub content_hash: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
