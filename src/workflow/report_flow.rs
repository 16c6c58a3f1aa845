//! 报告处理流程 - 流程层
//!
//! 核心职责：定义"一个报告"的完整处理流程
//!
//! 流程顺序：
//! 1. 构建提示词
//! 2. 调用结构化补全
//! 3. 解析 JSON
//!
//! 任何一步失败都只记录日志并返回 `None`，不会影响其他报告。

use serde_json::Value;
use tracing::{error, info, warn};

use crate::clients::{CompletionClient, JsonSchemaSpec};
use crate::error::ReportError;
use crate::models::Report;
use crate::services::build_user_prompt;
use crate::utils::truncate_text;
use crate::workflow::report_ctx::ReportCtx;

/// 解析失败时日志中保留的字符数
const MALFORMED_PREVIEW_CHARS: usize = 500;

/// 报告处理流程
///
/// - 只处理单个报告
/// - 不持有任何资源，补全客户端由外部注入
/// - 不关心结果表的键
pub struct ReportFlow<'a, C: CompletionClient> {
    client: &'a C,
    system_prompt: &'a str,
    schema: &'a JsonSchemaSpec,
}

impl<'a, C: CompletionClient> ReportFlow<'a, C> {
    /// 创建新的报告处理流程
    pub fn new(client: &'a C, system_prompt: &'a str, schema: &'a JsonSchemaSpec) -> Self {
        Self {
            client,
            system_prompt,
            schema,
        }
    }

    /// 处理一个报告，失败时返回 `None`
    pub async fn run(&self, ctx: &ReportCtx, report: &Report) -> Option<Value> {
        info!("{} 🤖 开始分析 ({} 字符)", ctx, report.text.chars().count());

        match self.try_run(report).await {
            Ok(value) => {
                info!("{} ✓ 分析完成", ctx);
                Some(value)
            }
            Err(ReportError::ResultParse { preview, source }) => {
                warn!("{} ⚠️ JSON 解析失败: {} | 返回内容: {}", ctx, source, preview);
                None
            }
            Err(e @ ReportError::NotAnObject { .. }) => {
                warn!("{} ⚠️ {}", ctx, e);
                None
            }
            Err(e) => {
                error!("{} ❌ 报告处理失败: {}", ctx, e);
                None
            }
        }
    }

    /// 处理一个报告，保留错误类型
    pub async fn try_run(&self, report: &Report) -> Result<Value, ReportError> {
        let user_prompt = build_user_prompt(&report.text);

        let response = self
            .client
            .complete(self.system_prompt, &user_prompt, self.schema)
            .await?;

        parse_extraction(&response)
    }
}

/// 把 LLM 返回的文本解析为 JSON 对象
pub fn parse_extraction(response: &str) -> Result<Value, ReportError> {
    let value: Value =
        serde_json::from_str(response).map_err(|source| ReportError::ResultParse {
            preview: truncate_text(response, MALFORMED_PREVIEW_CHARS),
            source,
        })?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Array(_) => Err(ReportError::NotAnObject { kind: "array" }),
        Value::String(_) => Err(ReportError::NotAnObject { kind: "string" }),
        Value::Number(_) => Err(ReportError::NotAnObject { kind: "number" }),
        Value::Bool(_) => Err(ReportError::NotAnObject { kind: "bool" }),
        Value::Null => Err(ReportError::NotAnObject { kind: "null" }),
    }
}
