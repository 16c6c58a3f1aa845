/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，`verbose` 为真时默认 `debug`。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `bind_address`: 监听地址
/// - `model`: LLM 模型名称
/// - `concurrency`: 报告并发上限
pub fn log_startup(bind_address: &str, model: &str, concurrency: Option<usize>) {
    info!("{}", "=".repeat(60));
    info!("🚀 报告分析服务启动");
    info!("🌐 监听地址: {}", bind_address);
    info!("🤖 LLM 模型: {}", model);
    match concurrency {
        Some(limit) => info!("📊 报告并发上限: {}", limit),
        None => info!("📊 报告并发上限: 不限制"),
    }
    info!("{}", "=".repeat(60));
}

/// 打印单次分析的统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `total`: 报告总数
/// - `keys`: 结果表中的键数量
pub fn log_analysis_stats(success: usize, total: usize, keys: usize) {
    info!("{}", "─".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", total - success);
    info!("📋 结果表条目: {}", keys);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars_not_bytes() {
        assert_eq!(truncate_text("скважина", 4), "сква...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
