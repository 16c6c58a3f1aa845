//! 分析结果存储 - 业务能力层

use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AnalysisRecord, ResultTable};

/// 结果表的持久化
pub trait ResultStore: Send + Sync {
    /// 保存结果表，返回带 ID 的记录
    fn create(
        &self,
        input_file_id: Uuid,
        result_table: ResultTable,
    ) -> impl Future<Output = AnalysisRecord> + Send;

    /// 按 ID 查询
    fn get(&self, id: Uuid) -> impl Future<Output = Option<AnalysisRecord>> + Send;
}

/// 内存中的结果存储
#[derive(Default)]
pub struct InMemoryResultStore {
    records: RwLock<HashMap<Uuid, AnalysisRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for InMemoryResultStore {
    async fn create(&self, input_file_id: Uuid, result_table: ResultTable) -> AnalysisRecord {
        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            input_file_id,
            result_table,
            created_at: Utc::now(),
        };

        debug!("保存分析结果 {} (文件 {})", record.id, input_file_id);
        self.records.write().await.insert(record.id, record.clone());

        record
    }

    async fn get(&self, id: Uuid) -> Option<AnalysisRecord> {
        self.records.read().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = InMemoryResultStore::new();
        let file_id = Uuid::new_v4();
        let mut table = ResultTable::new();
        table.insert("01.03.2024".to_string(), json!({ "Скважина": "101" }));

        let created = store.create(file_id, table.clone()).await;
        assert_eq!(created.input_file_id, file_id);

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched.result_table, table);
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }
}
