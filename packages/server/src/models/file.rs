use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::files::MonthlyCount;
use crate::metadata::FileRecord;

/// Response DTO for a single file.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileResponse {
    /// File ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    /// Display name.
    #[schema(example = "figure1.png")]
    pub name: String,
    /// Where the content can be fetched from, as reported by the blob store.
    #[schema(example = "https://files.example.com/bucket/t/o/1718000000000-abc-figure1.png")]
    pub location: String,
    /// MIME content type guessed from the name.
    #[schema(example = "image/png")]
    pub content_type: Option<String>,
    /// Size in bytes.
    #[schema(example = 142857)]
    pub size: i64,
    /// SHA-256 content hash.
    #[schema(example = "a1b2c3d4e5f6...")]
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            location: record.location,
            content_type: record.content_type,
            size: record.size,
            content_hash: record.content_hash,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response DTO for listing files.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
    pub total: u64,
}

impl From<Vec<FileRecord>> for FileListResponse {
    fn from(records: Vec<FileRecord>) -> Self {
        let files: Vec<FileResponse> = records.into_iter().map(Into::into).collect();
        Self {
            total: files.len() as u64,
            files,
        }
    }
}

/// Uploads in one calendar month (UTC).
#[derive(Serialize, utoipa::ToSchema)]
pub struct MonthlyCountResponse {
    #[schema(example = 2024)]
    pub year: i32,
    /// Month number, 1-12.
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2)]
    pub count: u64,
}

impl From<MonthlyCount> for MonthlyCountResponse {
    fn from(c: MonthlyCount) -> Self {
        Self {
            year: c.year,
            month: c.month,
            count: c.count,
        }
    }
}

/// Monthly upload counts, oldest month first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub stats: Vec<MonthlyCountResponse>,
}
