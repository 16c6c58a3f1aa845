use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 一个报告日期对应的文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// 日期键，格式 `DD.MM.YYYY`
    pub date: String,
    /// 汇总文本 + 工作表文本
    pub text: String,
}

impl Report {
    pub fn new(date: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            text: text.into(),
        }
    }
}

/// 结果表：事件开始日期 → LLM 提取结果
pub type ResultTable = BTreeMap<String, Value>;

/// 一次分析的持久化记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub input_file_id: Uuid,
    pub result_table: ResultTable,
    pub created_at: DateTime<Utc>,
}
