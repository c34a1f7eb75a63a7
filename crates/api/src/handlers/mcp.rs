use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use orchestrator_domain::Parameters;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    error::{ApiError, ApiResult},
    response::McpResponse,
    routes::AppState,
    validation::validate_query,
};

/// `/mcp/v1` 请求体
#[derive(Debug, Deserialize, Validate)]
pub struct McpRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_query"))]
    pub query: String,
    /// 会话上下文，后续请求带上 `transaction_id` 以继续同一交易
    #[serde(default)]
    pub context: Parameters,
}

/// 处理一条自然语言请求：映射为意图，交给调度管道执行
pub async fn handle_query(
    State(state): State<AppState>,
    payload: Result<Json<McpRequest>, JsonRejection>,
) -> ApiResult<Json<McpResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected MCP request body: {}", rejection.body_text());
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("Missing query in request"));
    }
    request.validate()?;

    let intent = state
        .intent_source
        .extract(&request.query, &request.context)
        .await?
        .ok_or_else(|| ApiError::bad_request("Could not map query to a Beckn intent"))?;

    info!(
        domain = %intent.domain,
        operation = %intent.operation,
        "Mapped query to intent"
    );

    let outcome = state.pipeline.handle(&intent).await?;

    Ok(Json(McpResponse::new(&intent.domain, outcome)))
}
