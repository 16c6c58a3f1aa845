//! 错误到 HTTP 响应的映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::{AnalysisError, AppError, StorageError};

impl AppError {
    /// 错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Analysis(AnalysisError::WorkbookRead { .. })
            | AppError::Analysis(AnalysisError::Structural { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Analysis(AnalysisError::NoSuccessfulResults { .. }) => StatusCode::BAD_GATEWAY,
            AppError::NotFound { .. }
            | AppError::Storage(StorageError::NotFound { .. })
            | AppError::Storage(StorageError::TemplateNotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(AnalysisError::DecodeTask(_))
            | AppError::Storage(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("❌ 请求失败 ({}): {}", status, self);
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let structural = AppError::from(AnalysisError::Structural { sheet_count: 1 });
        assert_eq!(structural.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let empty = AppError::from(AnalysisError::NoSuccessfulResults { report_count: 3 });
        assert_eq!(empty.status_code(), StatusCode::BAD_GATEWAY);

        let missing = AppError::from(StorageError::NotFound { id: Uuid::new_v4() });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let template = AppError::from(StorageError::TemplateNotFound {
            template: "daily".to_string(),
        });
        assert_eq!(template.status_code(), StatusCode::NOT_FOUND);

        let bad = AppError::BadRequest("no file".to_string());
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
    }
}
