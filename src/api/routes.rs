//! 分析接口处理函数

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::form::UploadForm;
use crate::api::SharedState;
use crate::clients::CompletionClient;
use crate::error::AppError;
use crate::models::AnalysisRecord;
use crate::services::{FileStore, ResultStore};

/// multipart 中携带文件的字段名
const FILE_FIELD: &str = "file";

/// `POST /api/analyzer/analyze/`
pub async fn analyze_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AnalysisRecord>), AppError>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    let (_, upload) = UploadForm::read(multipart, &[FILE_FIELD])
        .await?
        .into_single(FILE_FIELD)?;

    let record = state
        .analysis
        .analyze_and_store(&upload.filename, &upload.content_type, upload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/analyzer/{id}`
pub async fn get_result_handler<C, S, R>(
    State(state): State<SharedState<C, S, R>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisRecord>, AppError>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    Ok(Json(state.analysis.get_result(id).await?))
}
