//! HTTP 接口层
//!
//! 负责把文件分析用例和文件管理暴露为 HTTP 服务

pub mod error;
pub mod files;
pub mod form;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::clients::CompletionClient;
use crate::services::{FileStore, ResultStore};

pub use files::{
    delete_file_handler, get_file_by_template_handler, get_file_handler,
    get_files_by_ids_handler, upload_batch_handler, upload_file_handler,
};
pub use routes::{analyze_handler, get_result_handler};
pub use state::{AppState, SharedState};

/// 上传文件大小上限
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// 构建路由
///
/// 设置了 `static_dir` 时，存储目录挂载到 `/static`，文件 URL 可直接访问
pub fn router<C, S, R>(state: SharedState<C, S, R>) -> Router
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    let mut app = Router::new()
        .route("/api/analyzer/analyze/", post(analyze_handler::<C, S, R>))
        .route("/api/analyzer/{id}", get(get_result_handler::<C, S, R>))
        .route("/api/files/", post(upload_file_handler::<C, S, R>))
        .route("/api/files/batch/", post(upload_batch_handler::<C, S, R>))
        .route("/api/files/ids", post(get_files_by_ids_handler::<C, S, R>))
        .route(
            "/api/files/template_name/{name}",
            get(get_file_by_template_handler::<C, S, R>),
        )
        .route(
            "/api/files/{id}",
            get(get_file_handler::<C, S, R>).delete(delete_file_handler::<C, S, R>),
        );

    if let Some(dir) = &state.static_dir {
        info!("📂 静态文件目录: {} -> /static", dir.display());
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// 绑定地址并运行服务，直到收到退出信号
pub async fn serve<C, S, R>(
    bind_address: &str,
    state: SharedState<C, S, R>,
) -> std::io::Result<()>
where
    C: CompletionClient + 'static,
    S: FileStore + 'static,
    R: ResultStore + 'static,
{
    let app = router(state);

    let listener = TcpListener::bind(bind_address).await?;
    info!("🌐 服务已启动: {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 服务已关闭");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("收到 Ctrl+C，正在关闭服务"),
            Err(e) => {
                error!("无法监听 Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("收到 SIGTERM，正在关闭服务");
            }
            Err(e) => {
                error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
