//! 文件接口处理函数

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::api::form::{parse_data, UploadForm};
use crate::api::SharedState;
use crate::clients::CompletionClient;
use crate::error::AppError;
use crate::models::{FileCreate, FileCreateBatch, FileIds, FileList, StoredFile};
use crate::services::{FileStore, ResultStore};

const FILE_FIELD: &str = "file";
const FILES_FIELD: &str = "files";

/// `POST /api/files/`
///
/// 表单字段：`file` 为文件，`data` 为可选的 `FileCreate` JSON
pub async fn upload_file_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<StoredFile>), AppError>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    let (data, upload) = UploadForm::read(multipart, &[FILE_FIELD])
        .await?
        .into_single(FILE_FIELD)?;
    let meta: FileCreate = parse_data(data.as_deref())?;

    let stored = state
        .files
        .create_from_content(meta, &upload.filename, &upload.content, &upload.content_type)
        .await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// `POST /api/files/batch/`
///
/// 表单字段：多个 `files`，`data` 为可选的 `FileCreateBatch` JSON，按顺序对应
pub async fn upload_batch_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FileList>), AppError>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    let form = UploadForm::read(multipart, &[FILES_FIELD, FILE_FIELD]).await?;
    if form.uploads.is_empty() {
        return Err(AppError::BadRequest(format!("缺少 '{}' 字段", FILES_FIELD)));
    }
    let batch: FileCreateBatch = parse_data(form.data.as_deref())?;

    let files = state.files.create_batch(batch.files, form.uploads).await;

    Ok((StatusCode::CREATED, Json(FileList { files })))
}

/// `GET /api/files/{id}`
pub async fn get_file_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredFile>, AppError>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    Ok(Json(state.files.get(id).await?))
}

/// `DELETE /api/files/{id}`
pub async fn delete_file_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    state.files.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/files/ids`
pub async fn get_files_by_ids_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    Json(request): Json<FileIds>,
) -> Json<FileList>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    let files = state.files.get_by_ids(&request.ids).await;
    info!("📂 按 ID 查询文件: {}/{}", files.len(), request.ids.len());
    Json(FileList { files })
}

/// `GET /api/files/template_name/{name}`
pub async fn get_file_by_template_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    Path(name): Path<String>,
) -> Result<Json<StoredFile>, AppError>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    Ok(Json(state.files.get_by_template(&name).await?))
}
