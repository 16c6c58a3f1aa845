use std::sync::Arc;

use anyhow::{Context, Result};
use reportable::api::{self, AppState};
use reportable::services::{FileService, InMemoryResultStore, LocalFileStore};
use reportable::utils::logging;
use reportable::{AnalyzerService, Config, FileAnalysisService, OpenAiCompletionClient};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 组装服务
    let client = Arc::new(OpenAiCompletionClient::new(&config));
    logging::log_startup(
        &config.bind_address,
        client.model_name(),
        config.concurrency_limit(),
    );

    let analyzer =
        AnalyzerService::from_config(client, &config).context("加载提示词或 JSON Schema 失败")?;
    let store = LocalFileStore::from_config(&config);
    let static_dir = store.root().to_path_buf();
    let files = Arc::new(FileService::new(store, &config.upload_subdir));
    let analysis = FileAnalysisService::new(
        Arc::new(analyzer),
        Arc::clone(&files),
        Arc::new(InMemoryResultStore::new()),
    );
    let state = AppState::with_static_dir(analysis, files, static_dir);

    // 运行 HTTP 服务
    api::serve(&config.bind_address, state)
        .await
        .with_context(|| format!("HTTP 服务异常退出: {}", config.bind_address))?;

    Ok(())
}
