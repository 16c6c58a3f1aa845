use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务监听地址
    pub bind_address: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次补全的最大 token 数
    pub llm_max_tokens: u32,
    /// 系统提示词文件（JSON，包含 `system_prompt` 字段）
    pub prompts_path: String,
    /// JSON Schema 文件
    pub schema_path: String,
    /// 结果中表示"事件开始日期"的字段名，用作结果表的键
    pub event_start_field: String,
    /// 同时发往 LLM 的报告数量上限，0 表示不限制
    pub max_concurrent_reports: usize,
    // --- 文件存储配置 ---
    pub storage_root: String,
    pub public_base_url: String,
    pub upload_subdir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://llm.api.cloud.yandex.net/v1".to_string(),
            llm_model_name: String::new(),
            llm_max_tokens: 16384,
            prompts_path: "prompts.json".to_string(),
            schema_path: "schema.json".to_string(),
            event_start_field: "Начало мероприятия".to_string(),
            max_concurrent_reports: 0,
            storage_root: "storage".to_string(),
            public_base_url: "http://localhost:8000/static".to_string(),
            upload_subdir: "uploads".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(default.bind_address),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            prompts_path: std::env::var("LLM_PROMPTS_PATH").unwrap_or(default.prompts_path),
            schema_path: std::env::var("LLM_SCHEMA_PATH").unwrap_or(default.schema_path),
            event_start_field: std::env::var("EVENT_START_FIELD").unwrap_or(default.event_start_field),
            max_concurrent_reports: std::env::var("MAX_CONCURRENT_REPORTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_reports),
            storage_root: std::env::var("STORAGE_ROOT").unwrap_or(default.storage_root),
            public_base_url: std::env::var("PUBLIC_BASE_URL").unwrap_or(default.public_base_url),
            upload_subdir: std::env::var("UPLOAD_SUBDIR").unwrap_or(default.upload_subdir),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 设置了 `REPORTABLE_CONFIG` 时读取该 TOML 文件，否则读取环境变量
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("REPORTABLE_CONFIG") {
            Ok(path) => Self::from_toml_file(path),
            Err(_) => Ok(Self::from_env()),
        }
    }

    /// 0 表示不限制并发
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent_reports > 0).then_some(self.max_concurrent_reports)
    }

    /// 读取系统提示词
    pub fn load_system_prompt(&self) -> Result<String, ConfigError> {
        let prompts = read_json(&self.prompts_path)?;
        prompts
            .get("system_prompt")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingField {
                path: self.prompts_path.clone(),
                field: "system_prompt",
            })
    }

    /// 读取 JSON Schema 文档
    pub fn load_json_schema(&self) -> Result<Value, ConfigError> {
        read_json(&self.schema_path)
    }
}

fn read_json(path: &str) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::JsonParseFailed {
        path: path.to_string(),
        source,
    })
}
