//! 工作簿分析器 - 编排层
//!
//! ## 职责
//!
//! 把一个上传的工作簿变成一张结果表：
//!
//! 1. **提取**：解码工作簿，切分为按日期的报告
//! 2. **派发**：为每个报告创建一个处理任务，全部并发执行
//! 3. **收集**：等待全部完成，按派发顺序配对结果并写入结果表
//! 4. **完成**：结果表为空时整体失败
//!
//! ## 设计特点
//!
//! - 单个报告失败只影响它自己
//! - 任务不 spawn 到线程上，由 `join_all` 在当前任务内并发轮询
//! - 可选的 Semaphore 限制同时在途的 LLM 请求数量

use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::{CompletionClient, JsonSchemaSpec};
use crate::config::Config;
use crate::error::{AnalysisError, ConfigError};
use crate::models::{Report, ResultTable, Workbook};
use crate::services::extract_reports;
use crate::utils::logging::log_analysis_stats;
use crate::workflow::{ReportCtx, ReportFlow};

/// 分析阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Extracting,
    Dispatching,
    Collecting,
    Done,
    Failed,
}

impl Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AnalysisStage::Extracting => "📄 提取",
            AnalysisStage::Dispatching => "🚀 派发",
            AnalysisStage::Collecting => "📥 收集",
            AnalysisStage::Done => "✅ 完成",
            AnalysisStage::Failed => "❌ 失败",
        };
        f.write_str(label)
    }
}

/// 工作簿分析器
pub struct AnalyzerService<C: CompletionClient> {
    client: Arc<C>,
    system_prompt: String,
    schema: JsonSchemaSpec,
    event_start_field: String,
    concurrency_limit: Option<usize>,
    /// 同一个分析器上所有分析共享的并发上限
    limiter: Option<Arc<Semaphore>>,
}

impl<C: CompletionClient> AnalyzerService<C> {
    /// 创建分析器
    ///
    /// # 参数
    /// - `client`: 结构化补全客户端
    /// - `system_prompt`: 系统提示词，原样发送
    /// - `schema`: 结果必须符合的 JSON Schema
    /// - `event_start_field`: 用作结果表键的字段名
    /// - `concurrency_limit`: 同时在途的报告数量上限，`None` 表示不限制
    pub fn new(
        client: Arc<C>,
        system_prompt: impl Into<String>,
        schema: JsonSchemaSpec,
        event_start_field: impl Into<String>,
        concurrency_limit: Option<usize>,
    ) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            schema,
            event_start_field: event_start_field.into(),
            concurrency_limit,
            limiter: concurrency_limit.map(|limit| Arc::new(Semaphore::new(limit))),
        }
    }

    /// 按配置创建分析器，从磁盘读取提示词和 schema
    pub fn from_config(client: Arc<C>, config: &Config) -> Result<Self, ConfigError> {
        let system_prompt = config.load_system_prompt()?;
        let schema = JsonSchemaSpec::from_document(config.load_json_schema()?);

        Ok(Self::new(
            client,
            system_prompt,
            schema,
            config.event_start_field.clone(),
            config.concurrency_limit(),
        ))
    }

    /// 分析上传的文件内容
    ///
    /// 解码在阻塞线程池中进行
    pub async fn analyze(&self, content: Vec<u8>) -> Result<ResultTable, AnalysisError> {
        info!("{} 解码工作簿 ({} 字节)", AnalysisStage::Extracting, content.len());

        let decoded = tokio::task::spawn_blocking(move || Workbook::from_bytes(&content))
            .await
            .map_err(AnalysisError::DecodeTask)
            .and_then(|result| result);

        let workbook = decoded.map_err(|e| {
            error!("{} {}", AnalysisStage::Failed, e);
            e
        })?;

        self.analyze_workbook(&workbook).await
    }

    /// 分析已解码的工作簿
    pub async fn analyze_workbook(&self, workbook: &Workbook) -> Result<ResultTable, AnalysisError> {
        info!(
            "{} 工作表数量: {}",
            AnalysisStage::Extracting,
            workbook.sheet_count()
        );

        let reports = extract_reports(workbook).map_err(|e| {
            error!("{} {}", AnalysisStage::Failed, e);
            e
        })?;

        let outcomes = self.dispatch(&reports).await;

        info!("{} {} 个结果", AnalysisStage::Collecting, outcomes.len());
        let (table, success) = self.collect(&reports, outcomes);

        log_analysis_stats(success, reports.len(), table.len());

        if table.is_empty() {
            let e = AnalysisError::NoSuccessfulResults {
                report_count: reports.len(),
            };
            error!("{} {}", AnalysisStage::Failed, e);
            return Err(e);
        }

        info!("{} 结果表共 {} 条", AnalysisStage::Done, table.len());
        Ok(table)
    }

    /// 为每个报告创建任务并等待全部完成
    ///
    /// 返回值与 `reports` 按位置一一对应。
    async fn dispatch(&self, reports: &[Report]) -> Vec<Option<Value>> {
        let total = reports.len();
        match self.concurrency_limit {
            Some(limit) => info!(
                "{} {} 个报告 (并发上限 {})",
                AnalysisStage::Dispatching,
                total,
                limit
            ),
            None => info!("{} {} 个报告", AnalysisStage::Dispatching, total),
        }

        let flow = ReportFlow::new(self.client.as_ref(), &self.system_prompt, &self.schema);
        let flow = &flow;
        let limiter = self.limiter.as_deref();

        let tasks: Vec<_> = reports
            .iter()
            .enumerate()
            .map(|(index, report)| {
                let ctx = ReportCtx::new(index + 1, total, report.date.clone());
                async move {
                    // 信号量从不关闭，acquire 只会成功
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire().await.ok(),
                        None => None,
                    };

                    match AssertUnwindSafe(flow.run(&ctx, report)).catch_unwind().await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            error!("{} ❌ 处理过程中发生 panic", ctx);
                            None
                        }
                    }
                }
            })
            .collect();

        join_all(tasks).await
    }

    /// 按派发顺序把成功的结果写入结果表
    ///
    /// 返回结果表和成功数量。
    fn collect(&self, reports: &[Report], outcomes: Vec<Option<Value>>) -> (ResultTable, usize) {
        let mut table = ResultTable::new();
        let mut success = 0;

        for (report, outcome) in reports.iter().zip(outcomes) {
            let Some(value) = outcome else {
                continue;
            };
            success += 1;

            let key = result_key(&value, &self.event_start_field);
            if table.insert(key.clone(), value).is_some() {
                warn!(
                    "⚠️ 结果键 '{}' 重复，报告 {} 的结果覆盖了之前的结果",
                    key, report.date
                );
            }
        }

        (table, success)
    }
}

/// 计算结果在结果表中的键
///
/// 字段为非空字符串时原样使用；数字和布尔值按 JSON 文本渲染；
/// 其他情况（缺失、null、空字符串、数组、对象）使用当前 UTC 日期 `YYYY-MM-DD`。
pub fn result_key(value: &Value, field: &str) -> String {
    match value.get(field) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => scalar.to_string(),
        _ => Utc::now().date_naive().to_string(),
    }
}
