use async_trait::async_trait;
use orchestrator_core::OrchestratorResult;

use crate::entities::{ExecutionOutcome, Intent};

/// 可插拔的执行策略（编排器）
///
/// 策略负责在 search → select → init → confirm 序列中传递同一个交易ID，
/// 也负责判断状态序列是否合法。
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, intent: &Intent) -> OrchestratorResult<ExecutionOutcome>;
}
