//! 文件相关的数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 已存储的文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    /// 模板名，可按模板名查找文件
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub path: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// 创建文件时附带的信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileCreate {
    pub template_name: Option<String>,
    /// 覆盖上传时的文件名
    pub filename: Option<String>,
    /// 存储子目录，缺省时使用服务的默认目录
    pub subdir: Option<String>,
}

/// 批量创建时每个文件附带的信息，按上传顺序对应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileCreateBatch {
    pub files: Vec<FileCreate>,
}

/// 上传的文件内容
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// 按 ID 批量查询
#[derive(Debug, Clone, Deserialize)]
pub struct FileIds {
    pub ids: Vec<Uuid>,
}

/// 文件列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileList {
    pub files: Vec<StoredFile>,
}
