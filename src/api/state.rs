//! 路由共享状态

use std::path::PathBuf;
use std::sync::Arc;

use crate::clients::CompletionClient;
use crate::orchestrator::FileAnalysisService;
use crate::services::{FileService, FileStore, ResultStore};

/// 路由共享的服务
pub struct AppState<C, S, R>
where
    C: CompletionClient,
    S: FileStore,
    R: ResultStore,
{
    pub analysis: FileAnalysisService<C, S, R>,
    pub files: Arc<FileService<S>>,
    /// 文件存储根目录，挂载到 `/static`
    pub static_dir: Option<PathBuf>,
}

impl<C, S, R> AppState<C, S, R>
where
    C: CompletionClient,
    S: FileStore,
    R: ResultStore,
{
    pub fn new(analysis: FileAnalysisService<C, S, R>, files: Arc<FileService<S>>) -> Arc<Self> {
        Arc::new(Self {
            analysis,
            files,
            static_dir: None,
        })
    }

    pub fn with_static_dir(
        analysis: FileAnalysisService<C, S, R>,
        files: Arc<FileService<S>>,
        static_dir: impl Into<PathBuf>,
    ) -> Arc<Self> {
        Arc::new(Self {
            analysis,
            files,
            static_dir: Some(static_dir.into()),
        })
    }
}

pub type SharedState<C, S, R> = Arc<AppState<C, S, R>>;
