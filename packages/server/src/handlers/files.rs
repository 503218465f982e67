use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::files::{NewUpload, Replacement};
use crate::models::file::{FileListResponse, FileResponse, StatsResponse};
use crate::state::AppState;

/// Headroom above the blob limit for multipart framing and the `name` field.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn file_body_limit(max_blob_size: u64) -> DefaultBodyLimit {
    let limit = max_blob_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Fields of a multipart file form. Unknown fields are ignored.
#[derive(Default)]
struct FileForm {
    bytes: Option<Vec<u8>>,
    file_name: Option<String>,
    name: Option<String>,
}

impl FileForm {
    async fn read(mut multipart: Multipart, max_size: u64) -> Result<Self, AppError> {
        let mut form = FileForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            match field.name() {
                Some("file") => {
                    form.file_name = field.file_name().map(|s| s.to_string());
                    form.bytes = Some(read_limited(field, max_size).await?);
                }
                Some("name") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read name: {e}")))?;
                    // A blank name means "keep/derive the name".
                    if !text.trim().is_empty() {
                        form.name = Some(text);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

async fn read_limited(mut field: Field<'_>, max_size: u64) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (buf.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

fn parse_file_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid file ID: {raw}")))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Stores the `file` multipart field and records it for the caller. \
        An optional `name` field sets the display name (defaults to the upload filename).",
    request_body(content_type = "multipart/form-data", description = "File upload with optional name"),
    responses(
        (status = 201, description = "File created", body = FileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (OPERATION_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(owner_id = %auth_user.owner_id))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FileForm::read(multipart, state.config.storage.max_blob_size).await?;

    let bytes = form
        .bytes
        .ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let name = form
        .name
        .or(form.file_name)
        .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;

    let record = state
        .files
        .create(&auth_user.scope(), NewUpload { name, bytes })
        .await?;

    Ok((StatusCode::CREATED, Json(FileResponse::from(record))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Files",
    operation_id = "listFiles",
    summary = "List the caller's files",
    description = "Returns every file owned by the caller within their tenant, oldest first.",
    responses(
        (status = 200, description = "File list", body = FileListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (OPERATION_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.owner_id))]
pub async fn list_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<FileListResponse>, AppError> {
    let records = state.files.list(&auth_user.scope()).await?;
    Ok(Json(records.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Files",
    operation_id = "replaceFile",
    summary = "Rename a file or replace its content",
    description = "Both multipart fields are optional. `file` replaces the content; `name` renames. \
        A blank `name` keeps the current name. With neither field the file is returned unchanged.",
    params(("id" = String, Path, description = "File ID")),
    request_body(content_type = "multipart/form-data", description = "Optional new content and name"),
    responses(
        (status = 200, description = "File updated", body = FileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (OPERATION_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(owner_id = %auth_user.owner_id))]
pub async fn replace_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<FileResponse>, AppError> {
    let id = parse_file_id(&id)?;
    let form = FileForm::read(multipart, state.config.storage.max_blob_size).await?;

    let replacement = Replacement {
        name: form.name,
        bytes: form.bytes,
    };
    let record = state
        .files
        .replace(&auth_user.scope(), id, replacement)
        .await?;

    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Files",
    operation_id = "deleteFile",
    summary = "Delete a file",
    description = "Deletes the stored content, confirms it is gone, then removes the record. \
        If removal of the content cannot be confirmed the record is kept and 500 is returned.",
    params(("id" = String, Path, description = "File ID")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (OPERATION_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.owner_id))]
pub async fn delete_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_file_id(&id)?;
    state.files.delete(&auth_user.scope(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Files",
    operation_id = "fileStats",
    summary = "Monthly upload counts",
    description = "Counts the caller's files by the UTC calendar month they were created in, oldest month first.",
    responses(
        (status = 200, description = "Monthly counts", body = StatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (OPERATION_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.owner_id))]
pub async fn file_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let counts = state.files.monthly_counts(&auth_user.scope()).await?;
    Ok(Json(StatsResponse {
        stats: counts.into_iter().map(Into::into).collect(),
    }))
}
