//! 领域仓储抽象
//!
//! 定义交易记录存取的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orchestrator_core::OrchestratorResult;

use crate::entities::{Parameters, TransactionRecord, TransactionState, TransactionUpdate};

/// 交易生命周期存储抽象
///
/// 单个操作在存储内部是原子的；跨操作不提供事务。对同一交易ID的并发
/// `update` 是读-改-写，后写者覆盖先写者的合并结果。
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// 分配新ID并创建记录，状态为 `created`，历史中含一条种子条目
    async fn create(&self, domain: &str, context: Parameters) -> OrchestratorResult<TransactionRecord>;

    /// 记录ID不存在时插入 `record`，已存在时保持原样。返回存储中的记录以及是否插入
    async fn get_or_insert(&self, record: TransactionRecord) -> OrchestratorResult<(TransactionRecord, bool)>;

    async fn get(&self, id: &str) -> OrchestratorResult<Option<TransactionRecord>>;

    /// 合并部分更新。ID不存在时返回 `TransactionNotFound`，不会隐式创建
    async fn update(&self, id: &str, update: TransactionUpdate) -> OrchestratorResult<TransactionRecord>;

    async fn list(&self) -> OrchestratorResult<Vec<TransactionRecord>>;

    async fn list_by_domain(&self, domain: &str) -> OrchestratorResult<Vec<TransactionRecord>>;

    async fn list_by_state(&self, state: &TransactionState) -> OrchestratorResult<Vec<TransactionRecord>>;

    async fn delete(&self, id: &str) -> OrchestratorResult<bool>;

    /// 删除 `updated_at` 早于 `cutoff` 的记录，返回删除数量
    async fn delete_updated_before(&self, cutoff: DateTime<Utc>) -> OrchestratorResult<usize>;

    async fn count(&self) -> OrchestratorResult<usize>;
}
