use thiserror::Error;
use uuid::Uuid;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 分析流程错误
    #[error("分析错误: {0}")]
    Analysis(#[from] AnalysisError),
    /// 存储相关错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 记录不存在
    #[error("{entity} 不存在: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    /// 请求内容无效
    #[error("请求无效: {0}")]
    BadRequest(String),
}

/// 分析流程错误
///
/// 只有这几种情况会逃出分析器，单个报告的失败在报告流程内部被吞掉。
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 字节内容无法解析为工作簿
    #[error("无法读取工作簿: {source}")]
    WorkbookRead {
        #[source]
        source: calamine::Error,
    },
    /// 工作簿结构不满足要求（少于 3 个工作表）
    #[error("文件必须至少包含 3 个工作表（当前状态、汇总、按日期的报告），实际只有 {sheet_count} 个")]
    Structural { sheet_count: usize },
    /// 解码任务异常退出
    #[error("工作簿解码任务异常退出: {0}")]
    DecodeTask(#[source] tokio::task::JoinError),
    /// 所有报告都处理失败
    #[error("没有任何报告处理成功 (报告总数: {report_count})")]
    NoSuccessfulResults { report_count: usize },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败: {0}")]
    RequestBuild(#[source] async_openai::error::OpenAIError),
    /// API 调用失败（网络、鉴权、限流）
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 单个报告处理错误
///
/// 报告流程会把它转换成 `None`，不会向上传播。
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Completion(#[from] LlmError),
    /// 返回内容不是合法的 JSON
    #[error("JSON解析失败: {source}")]
    ResultParse {
        preview: String,
        #[source]
        source: serde_json::Error,
    },
    /// 返回的是 JSON，但不是对象
    #[error("LLM 返回的 JSON 不是对象 (类型: {kind})")]
    NotAnObject { kind: &'static str },
}

/// 日期解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// 无法识别的日期格式
    #[error("无法识别的日期格式: '{0}'")]
    Unrecognized(String),
    /// 格式可识别但日期不存在
    #[error("日期超出范围: '{0}'")]
    OutOfRange(String),
    /// 单元格类型不是日期
    #[error("单元格不是日期类型")]
    NotADate,
    /// 日期正则无法编译
    #[error("日期正则无法编译: {0}")]
    Pattern(String),
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 文件上传失败
    #[error("文件上传失败 ({path}): {source}")]
    UploadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除文件失败
    #[error("删除文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件记录不存在
    #[error("文件不存在: {id}")]
    NotFound { id: Uuid },
    /// 按模板名找不到文件
    #[error("模板 '{template}' 对应的文件不存在")]
    TemplateNotFound { template: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 缺少必需字段
    #[error("{path} 缺少字段 '{field}'")]
    MissingField { path: String, field: &'static str },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
