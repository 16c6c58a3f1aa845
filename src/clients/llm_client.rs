/// LLM API 客户端
///
/// 封装结构化输出（JSON Schema 约束）的补全调用。
/// 兼容 OpenAI API 的服务都可以使用（Yandex、Azure、Gemini 等）。
use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;

/// 未提供名称时使用的 schema 名
const DEFAULT_SCHEMA_NAME: &str = "report_extraction";

/// 发送给补全服务的 JSON Schema 约束
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub description: Option<String>,
    pub schema: Value,
    pub strict: Option<bool>,
}

impl JsonSchemaSpec {
    /// 从 schema 文档构建
    ///
    /// 文档本身已经是 `{ "name", "schema", ... }` 信封时直接使用，
    /// 否则整个文档就是 schema，包装在默认名称下。
    pub fn from_document(document: Value) -> Self {
        let is_envelope = document.get("name").map_or(false, Value::is_string)
            && document.get("schema").map_or(false, Value::is_object);

        if is_envelope {
            Self {
                name: document["name"].as_str().unwrap_or(DEFAULT_SCHEMA_NAME).to_string(),
                description: document
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                strict: document.get("strict").and_then(Value::as_bool),
                schema: document["schema"].clone(),
            }
        } else {
            Self {
                name: DEFAULT_SCHEMA_NAME.to_string(),
                description: None,
                schema: document,
                strict: None,
            }
        }
    }
}

/// 结构化补全能力
///
/// 返回原始文本，调用方负责校验是否为合法 JSON。
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &JsonSchemaSpec,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// 基于 `async-openai` 的补全客户端
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_tokens: u32,
}

impl OpenAiCompletionClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn build_messages(
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(LlmError::RequestBuild)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()
            .map_err(LlmError::RequestBuild)?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ])
    }
}

impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &JsonSchemaSpec,
    ) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_prompt.chars().count());

        let messages = Self::build_messages(system_prompt, user_prompt)?;

        // 温度固定为 0，保证同一报告的输出尽量确定
        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(self.max_tokens)
            .stream(false)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: schema.name.clone(),
                    description: schema.description.clone(),
                    schema: Some(schema.schema.clone()),
                    strict: schema.strict,
                },
            })
            .build()
            .map_err(LlmError::RequestBuild)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                source: e,
            }
        })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })
    }
}
