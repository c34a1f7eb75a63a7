use async_trait::async_trait;
use orchestrator_core::OrchestratorResult;

use crate::entities::{Intent, Parameters};

/// 意图源：把自然语言请求转换为结构化意图
///
/// 无法识别时返回 `Ok(None)`，由前端映射为客户端错误。
#[async_trait]
pub trait IntentSource: Send + Sync {
    async fn extract(&self, query: &str, context: &Parameters) -> OrchestratorResult<Option<Intent>>;
}
