use async_trait::async_trait;
use orchestrator_core::{OrchestratorError, OrchestratorResult};
use serde_json::Value;

use crate::entities::Parameters;

/// 协议网关：与对手方网络通信的客户端
///
/// 每个操作的返回值都必须带有 `transactionId` 字段。
#[async_trait]
pub trait ProtocolGateway: Send + Sync {
    async fn search(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value>;

    async fn select(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value>;

    async fn init(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value>;

    async fn confirm(&self, domain: &str, parameters: &Parameters) -> OrchestratorResult<Value>;
}

/// 从网关响应中取出交易ID
pub fn response_transaction_id(response: &Value) -> OrchestratorResult<String> {
    response
        .get("transactionId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| OrchestratorError::gateway("网关响应缺少 transactionId"))
}
