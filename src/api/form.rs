//! multipart 表单读取

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;
use crate::models::FileUpload;

/// 上传文件没有文件名时使用的名称
const FALLBACK_FILENAME: &str = "upload.xlsx";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 携带 JSON 信息的文本字段
const DATA_FIELD: &str = "data";

/// 读取后的表单：文件按上传顺序排列
pub struct UploadForm {
    pub data: Option<String>,
    pub uploads: Vec<FileUpload>,
}

impl UploadForm {
    /// 读取表单，`file_fields` 中列出的字段视为文件，其余字段忽略
    pub async fn read(mut multipart: Multipart, file_fields: &[&str]) -> Result<Self, AppError> {
        let mut data = None;
        let mut uploads = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == DATA_FIELD {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                data = Some(text);
                continue;
            }

            if !file_fields.contains(&name.as_str()) {
                debug!("忽略 multipart 字段: {:?}", name);
                continue;
            }

            let filename = field
                .file_name()
                .filter(|name| !name.is_empty())
                .unwrap_or(FALLBACK_FILENAME)
                .to_string();
            let content_type = field
                .content_type()
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;

            uploads.push(FileUpload {
                filename,
                content_type,
                content: content.to_vec(),
            });
        }

        Ok(Self { data, uploads })
    }

    /// 取出第一个文件，没有文件时返回 400
    pub fn into_single(self, field: &str) -> Result<(Option<String>, FileUpload), AppError> {
        let data = self.data;
        self.uploads
            .into_iter()
            .next()
            .map(|upload| (data, upload))
            .ok_or_else(|| AppError::BadRequest(format!("缺少 '{}' 字段", field)))
    }
}

/// 解析 `data` 字段，缺省时使用默认值
pub fn parse_data<T: DeserializeOwned + Default>(data: Option<&str>) -> Result<T, AppError> {
    match data.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => serde_json::from_str(text)
            .map_err(|e| AppError::BadRequest(format!("'{}' 字段不是合法的 JSON: {}", DATA_FIELD, e))),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileCreate, FileCreateBatch};

    #[test]
    fn test_parse_data_defaults_when_missing() {
        let meta: FileCreate = parse_data(None).unwrap();
        assert_eq!(meta, FileCreate::default());

        let meta: FileCreate = parse_data(Some("  ")).unwrap();
        assert_eq!(meta, FileCreate::default());
    }

    #[test]
    fn test_parse_data_reads_json() {
        let meta: FileCreate = parse_data(Some(r#"{"template_name": "daily"}"#)).unwrap();
        assert_eq!(meta.template_name.as_deref(), Some("daily"));

        let batch: FileCreateBatch =
            parse_data(Some(r#"{"files": [{"subdir": "a"}, {}]}"#)).unwrap();
        assert_eq!(batch.files.len(), 2);
        assert_eq!(batch.files[0].subdir.as_deref(), Some("a"));
    }

    #[test]
    fn test_parse_data_rejects_invalid_json() {
        let result: Result<FileCreate, _> = parse_data(Some("{not json"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
