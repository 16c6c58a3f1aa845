//! 文件服务 - 业务能力层
//!
//! 负责"保存上传的文件并给出可访问的 URL"。
//! 内容存储通过 `FileStore` 抽象，元数据保存在内存中。

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::future::join_all;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::StorageError;
use crate::models::{FileCreate, FileUpload, StoredFile};

/// 文件内容存储
pub trait FileStore: Send + Sync {
    /// 写入内容
    fn upload(
        &self,
        path: &str,
        content: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// 获取可访问的 URL
    fn url(&self, path: &str) -> impl Future<Output = String> + Send;

    /// 删除内容
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// 本地目录存储
pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.storage_root, &config.public_base_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for LocalFileStore {
    async fn upload(
        &self,
        path: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let full_path = self.root.join(path);
        debug!(
            "写入文件: {} ({} 字节, {})",
            full_path.display(),
            content.len(),
            content_type
        );

        let upload_failed = |source| StorageError::UploadFailed {
            path: path.to_string(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(upload_failed)?;
        }
        fs::write(&full_path, content).await.map_err(upload_failed)
    }

    async fn url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), path)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        fs::remove_file(self.root.join(path))
            .await
            .map_err(|source| StorageError::DeleteFailed {
                path: path.to_string(),
                source,
            })
    }
}

/// 文件服务
///
/// 职责：
/// - 为上传内容生成 ID 和存储路径
/// - 写入内容存储并记录元数据
/// - 按 ID、ID 列表、模板名查询，按 ID 删除
pub struct FileService<S: FileStore> {
    store: S,
    subdir: String,
    files: RwLock<HashMap<Uuid, StoredFile>>,
}

impl<S: FileStore> FileService<S> {
    pub fn new(store: S, subdir: impl Into<String>) -> Self {
        Self {
            store,
            subdir: subdir.into(),
            files: RwLock::new(HashMap::new()),
        }
    }

    /// 保存字节内容
    ///
    /// # 参数
    /// - `meta`: 模板名、覆盖文件名、子目录
    /// - `filename`: 上传时的文件名
    /// - `content`: 文件内容
    /// - `content_type`: MIME 类型
    pub async fn create_from_content(
        &self,
        meta: FileCreate,
        filename: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<StoredFile, StorageError> {
        let id = Uuid::new_v4();
        let filename = sanitize_filename(meta.filename.as_deref().unwrap_or(filename));
        let subdir = meta
            .subdir
            .as_deref()
            .map(sanitize_subdir)
            .filter(|subdir| !subdir.is_empty())
            .unwrap_or_else(|| sanitize_subdir(&self.subdir));
        let path = format!("{}/{}_{}", subdir, id, filename);

        self.store.upload(&path, content, content_type).await?;

        let stored = StoredFile {
            id,
            url: self.store.url(&path).await,
            filename,
            content_type: content_type.to_string(),
            size: content.len() as u64,
            template_name: meta.template_name,
            path,
            created_at: Utc::now(),
        };

        self.files.write().await.insert(id, stored.clone());
        info!("📁 文件已保存: {} ({} 字节)", stored.filename, stored.size);

        Ok(stored)
    }

    /// 批量保存
    ///
    /// 所有文件并发写入；写入失败的文件记录日志后跳过，不影响其他文件。
    /// `metas` 比 `uploads` 短时，多出的文件使用默认信息。
    pub async fn create_batch(
        &self,
        metas: Vec<FileCreate>,
        uploads: Vec<FileUpload>,
    ) -> Vec<StoredFile> {
        let total = uploads.len();
        let mut metas = metas.into_iter();

        let tasks: Vec<_> = uploads
            .iter()
            .map(|upload| {
                let meta = metas.next().unwrap_or_default();
                self.create_from_content(meta, &upload.filename, &upload.content, &upload.content_type)
            })
            .collect();

        let created: Vec<StoredFile> = join_all(tasks)
            .await
            .into_iter()
            .zip(&uploads)
            .filter_map(|(result, upload)| match result {
                Ok(stored) => Some(stored),
                Err(e) => {
                    warn!("⚠️ 文件 '{}' 保存失败，已跳过: {}", upload.filename, e);
                    None
                }
            })
            .collect();

        info!("📁 批量保存完成: {}/{}", created.len(), total);
        created
    }

    /// 按 ID 查询文件
    pub async fn get(&self, id: Uuid) -> Result<StoredFile, StorageError> {
        let stored = self
            .files
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound { id })?;

        Ok(self.with_fresh_url(stored).await)
    }

    /// 按 ID 列表查询，结果顺序与请求一致，不存在的 ID 被忽略
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Vec<StoredFile> {
        if ids.is_empty() {
            debug!("ID 列表为空");
            return Vec::new();
        }

        let found: Vec<StoredFile> = {
            let files = self.files.read().await;
            ids.iter().filter_map(|id| files.get(id).cloned()).collect()
        };
        debug!("按 ID 查询: 请求 {} 个，找到 {} 个", ids.len(), found.len());

        let mut result = Vec::with_capacity(found.len());
        for stored in found {
            result.push(self.with_fresh_url(stored).await);
        }
        result
    }

    /// 按模板名查询，多个文件使用同一模板名时返回最新的一个
    pub async fn get_by_template(&self, template: &str) -> Result<StoredFile, StorageError> {
        let stored = self
            .files
            .read()
            .await
            .values()
            .filter(|stored| stored.template_name.as_deref() == Some(template))
            .max_by_key(|stored| stored.created_at)
            .cloned()
            .ok_or_else(|| StorageError::TemplateNotFound {
                template: template.to_string(),
            })?;

        Ok(self.with_fresh_url(stored).await)
    }

    /// 删除文件及其元数据
    pub async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let stored = self
            .files
            .write()
            .await
            .remove(&id)
            .ok_or(StorageError::NotFound { id })?;

        self.store.delete(&stored.path).await?;
        info!("🗑️ 文件已删除: {} ({})", stored.filename, id);
        Ok(())
    }

    // URL 每次重新生成，存储的 URL 可能会过期
    async fn with_fresh_url(&self, mut stored: StoredFile) -> StoredFile {
        stored.url = self.store.url(&stored.path).await;
        stored
    }
}

/// 只保留文件名的最后一段，防止路径穿越
fn sanitize_filename(filename: &str) -> String {
    let normalized = filename.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "file".to_string())
}

/// 子目录只保留普通路径段
fn sanitize_subdir(subdir: &str) -> String {
    subdir
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(root: &Path) -> FileService<LocalFileStore> {
        FileService::new(
            LocalFileStore::new(root, "http://files.local/static/"),
            "uploads",
        )
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.xlsx"), "report.xlsx");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\me\отчёт.xlsx"), "отчёт.xlsx");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let stored = service
            .create_from_content(
                FileCreate::default(),
                "report.xlsx",
                b"content",
                "application/octet-stream",
            )
            .await
            .unwrap();

        assert_eq!(stored.size, 7);
        assert_eq!(stored.filename, "report.xlsx");
        assert_eq!(
            stored.url,
            format!("http://files.local/static/{}", stored.path)
        );
        assert_eq!(
            std::fs::read(dir.path().join(&stored.path)).unwrap(),
            b"content"
        );

        let fetched = service.get(stored.id).await.unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_delete_removes_content_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let stored = service
            .create_from_content(FileCreate::default(), "a.txt", b"a", "text/plain")
            .await
            .unwrap();
        service.delete(stored.id).await.unwrap();

        assert!(!dir.path().join(&stored.path).exists());
        assert!(matches!(
            service.get(stored.id).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let id = Uuid::new_v4();

        match service.get(id).await {
            Err(StorageError::NotFound { id: missing }) => assert_eq!(missing, id),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_sanitize_subdir() {
        assert_eq!(sanitize_subdir("templates/2024"), "templates/2024");
        assert_eq!(sanitize_subdir("../../etc"), "etc");
        assert_eq!(sanitize_subdir(r"a\..\b"), "a/b");
        assert_eq!(sanitize_subdir("./"), "");
    }

    #[tokio::test]
    async fn test_create_applies_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let meta = FileCreate {
            template_name: Some("daily".to_string()),
            filename: Some("шаблон.xlsx".to_string()),
            subdir: Some("../templates".to_string()),
        };
        let stored = service
            .create_from_content(meta, "upload.bin", b"xlsx", "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(stored.filename, "шаблон.xlsx");
        assert_eq!(stored.template_name.as_deref(), Some("daily"));
        assert!(stored.path.starts_with("templates/"));
        assert!(dir.path().join(&stored.path).exists());
    }

    #[tokio::test]
    async fn test_create_batch_pairs_metadata_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let metas = vec![FileCreate {
            template_name: Some("first".to_string()),
            ..FileCreate::default()
        }];
        let uploads = vec![
            FileUpload {
                filename: "a.txt".to_string(),
                content_type: "text/plain".to_string(),
                content: b"a".to_vec(),
            },
            FileUpload {
                filename: "b.txt".to_string(),
                content_type: "text/plain".to_string(),
                content: b"bb".to_vec(),
            },
        ];

        let created = service.create_batch(metas, uploads).await;

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].filename, "a.txt");
        assert_eq!(created[0].template_name.as_deref(), Some("first"));
        assert_eq!(created[1].filename, "b.txt");
        assert_eq!(created[1].template_name, None);
        assert_eq!(created[1].size, 2);
    }

    #[tokio::test]
    async fn test_get_by_ids_keeps_order_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let a = service
            .create_from_content(FileCreate::default(), "a.txt", b"a", "text/plain")
            .await
            .unwrap();
        let b = service
            .create_from_content(FileCreate::default(), "b.txt", b"b", "text/plain")
            .await
            .unwrap();

        let found = service.get_by_ids(&[b.id, Uuid::new_v4(), a.id]).await;

        let ids: Vec<Uuid> = found.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        assert!(service.get_by_ids(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_template_returns_latest() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let meta = || FileCreate {
            template_name: Some("daily".to_string()),
            ..FileCreate::default()
        };

        service
            .create_from_content(meta(), "old.xlsx", b"old", "application/octet-stream")
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let latest = service
            .create_from_content(meta(), "new.xlsx", b"new", "application/octet-stream")
            .await
            .unwrap();

        let found = service.get_by_template("daily").await.unwrap();
        assert_eq!(found.id, latest.id);

        assert!(matches!(
            service.get_by_template("weekly").await,
            Err(StorageError::TemplateNotFound { .. })
        ));
    }
}
