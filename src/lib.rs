//! # Reportable
//!
//! 把多工作表的报告文件交给 LLM 做结构化抽取，汇总为按事件开始日期索引的结果表
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有外部资源（LLM HTTP 客户端），只暴露能力
//! - `CompletionClient` - 带 JSON Schema 约束的补全能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心调度
//! - `sheet_extractor` - 工作簿 → 按日期的报告
//! - `prompt_builder` - 报告文本 → 用户提示词
//! - `file_service` / `result_store` - 上传文件和分析结果的存取
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个报告"的完整处理流程
//! - `ReportCtx` - 上下文封装（报告序号 + 日期）
//! - `ReportFlow` - 流程编排（prompt → LLM → JSON）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/analyzer` - 工作簿分析器，管理并发和结果汇总
//! - `orchestrator/file_analysis` - 上传、分析、保存的完整用例
//!
//! ### ⑤ 接口层（API）
//! - `api/` - axum 路由，把用例暴露为 HTTP 服务
//!
//! ## 模块结构

pub mod api;
pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CompletionClient, JsonSchemaSpec, OpenAiCompletionClient};
pub use config::Config;
pub use error::{AnalysisError, AppError, AppResult};
pub use models::{AnalysisRecord, Report, ResultTable, Workbook};
pub use orchestrator::{AnalyzerService, FileAnalysisService};
pub use workflow::{ReportCtx, ReportFlow};
