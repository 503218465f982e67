use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::file_record;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;

    Ok(db)
}

/// Create or migrate tables for every registered entity.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("filehub::entity::*")
        .sync(db)
        .await
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Listing and monthly stats:
    // SELECT ... FROM file_record WHERE tenant_id = ? AND owner_id = ? ORDER BY created_at
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_file_record_scope_created")
        .table(file_record::Entity)
        .col(file_record::Column::TenantId)
        .col(file_record::Column::OwnerId)
        .col(file_record::Column::CreatedAt)
        .to_owned();

    let backend = db.get_database_backend();
    match db.execute_raw(backend.build(&stmt)).await {
        Ok(_) => info!("Ensured index idx_file_record_scope_created exists"),
        Err(e) => warn!(
            "Failed to create index idx_file_record_scope_created: {}",
            e
        ),
    }

    Ok(())
}
