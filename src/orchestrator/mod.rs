//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次分析的整体调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `analyzer` - 工作簿分析器
//! - 解码工作簿并切分报告
//! - 并发派发报告（可选 Semaphore 限流）
//! - 按派发顺序收集结果、计算结果表的键
//! - 输出单次分析的统计信息
//!
//! ### `file_analysis` - 文件分析用例
//! - 保存上传文件
//! - 调用分析器
//! - 保存结果表
//!
//! ## 层次关系
//!
//! ```text
//! file_analysis (上传文件 → 结果记录)
//!     ↓
//! analyzer (Workbook → ResultTable)
//!     ↓
//! workflow::ReportFlow (处理单个 Report)
//!     ↓
//! services (能力层：sheet_extractor / prompt_builder / file_service / result_store)
//!     ↓
//! clients (基础设施：CompletionClient)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：analyzer 管一次分析，file_analysis 管文件和结果的存取
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务逻辑**：只做调度和统计，不解析单元格、不拼接提示词

pub mod analyzer;
pub mod file_analysis;

// 重新导出主要类型
pub use analyzer::{result_key, AnalysisStage, AnalyzerService};
pub use file_analysis::FileAnalysisService;
