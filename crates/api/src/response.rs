use axum::{http::StatusCode, response::IntoResponse, Json};
use orchestrator_domain::ExecutionOutcome;
use serde::{Deserialize, Serialize};

const SUCCESS: &str = "success";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            status: SUCCESS.to_string(),
            data,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// 会话上下文，客户端在后续请求中回传以继续同一次协商
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub transaction_id: String,
    pub domain: String,
    pub state: String,
}

/// `/mcp/v1` 的成功响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub status: String,
    pub data: ExecutionOutcome,
    pub conversation_context: ConversationContext,
}

impl McpResponse {
    pub fn new(domain: &str, outcome: ExecutionOutcome) -> Self {
        let conversation_context = ConversationContext {
            transaction_id: outcome.transaction_id.clone(),
            domain: domain.to_string(),
            state: outcome.state.clone(),
        };
        Self {
            status: SUCCESS.to_string(),
            data: outcome,
            conversation_context,
        }
    }
}

pub fn success<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, ApiResponse::success(data))
}
