//! 文件分析用例 - 编排层
//!
//! 上传文件 → 分析 → 保存结果表 → 返回记录

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::clients::CompletionClient;
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisRecord, FileCreate};
use crate::orchestrator::analyzer::AnalyzerService;
use crate::services::{FileService, FileStore, ResultStore};

/// 文件分析服务
///
/// 持有分析器、文件服务和结果存储，HTTP 层只和它打交道。
pub struct FileAnalysisService<C, S, R>
where
    C: CompletionClient,
    S: FileStore,
    R: ResultStore,
{
    analyzer: Arc<AnalyzerService<C>>,
    files: Arc<FileService<S>>,
    results: Arc<R>,
}

impl<C, S, R> FileAnalysisService<C, S, R>
where
    C: CompletionClient,
    S: FileStore,
    R: ResultStore,
{
    pub fn new(
        analyzer: Arc<AnalyzerService<C>>,
        files: Arc<FileService<S>>,
        results: Arc<R>,
    ) -> Self {
        Self {
            analyzer,
            files,
            results,
        }
    }

    /// 保存上传的文件并分析，返回保存后的分析记录
    ///
    /// # 参数
    /// - `filename`: 原始文件名
    /// - `content_type`: MIME 类型
    /// - `content`: 文件内容
    ///
    /// # 返回
    /// 分析失败时文件仍然保留，便于排查
    pub async fn analyze_and_store(
        &self,
        filename: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> AppResult<AnalysisRecord> {
        info!("📤 收到文件 '{}' ({} 字节)", filename, content.len());

        let stored = self
            .files
            .create_from_content(FileCreate::default(), filename, &content, content_type)
            .await?;

        let table = self.analyzer.analyze(content).await.map_err(|e| {
            error!("[文件 {}] 分析失败: {}", stored.id, e);
            e
        })?;

        let record = self.results.create(stored.id, table).await;
        info!(
            "[文件 {}] ✓ 分析结果已保存: {} ({} 条)",
            stored.id,
            record.id,
            record.result_table.len()
        );

        Ok(record)
    }

    /// 查询分析结果
    pub async fn get_result(&self, id: Uuid) -> AppResult<AnalysisRecord> {
        self.results.get(id).await.ok_or(AppError::NotFound {
            entity: "分析结果",
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::JsonSchemaSpec;
    use crate::error::{AnalysisError, LlmError};
    use crate::services::{InMemoryResultStore, LocalFileStore};
    use serde_json::json;

    struct UnreachableClient;

    impl CompletionClient for UnreachableClient {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _schema: &JsonSchemaSpec,
        ) -> Result<String, LlmError> {
            panic!("completion must not be called");
        }
    }

    fn service(
        root: &std::path::Path,
    ) -> FileAnalysisService<UnreachableClient, LocalFileStore, InMemoryResultStore> {
        let analyzer = AnalyzerService::new(
            Arc::new(UnreachableClient),
            "system",
            JsonSchemaSpec::from_document(json!({ "type": "object" })),
            "Начало мероприятия",
            None,
        );
        let files = FileService::new(LocalFileStore::new(root, "http://localhost/static"), "uploads");

        FileAnalysisService::new(
            Arc::new(analyzer),
            Arc::new(files),
            Arc::new(InMemoryResultStore::new()),
        )
    }

    #[tokio::test]
    async fn test_unknown_result_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let result = service.get_result(Uuid::new_v4()).await;

        assert!(matches!(
            result,
            Err(AppError::NotFound {
                entity: "分析结果",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_analysis_keeps_uploaded_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let result = service
            .analyze_and_store("broken.xlsx", "application/octet-stream", b"garbage".to_vec())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Analysis(AnalysisError::WorkbookRead { .. }))
        ));
        let uploaded = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
        assert_eq!(uploaded, 1);
    }
}
