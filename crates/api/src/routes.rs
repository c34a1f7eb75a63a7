use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use orchestrator_dispatcher::DispatchPipeline;
use orchestrator_domain::IntentSource;

use crate::handlers::{
    health::health_check,
    mcp::handle_query,
    strategies::list_strategies,
    transactions::{cancel_transaction, delete_transaction, get_transaction, list_transactions},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DispatchPipeline>,
    pub intent_source: Arc<dyn IntentSource>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 自然语言入口
        .route("/mcp/v1", post(handle_query))
        // 交易诊断API
        .route("/api/transactions", get(list_transactions))
        .route(
            "/api/transactions/{id}",
            get(get_transaction).delete(delete_transaction),
        )
        .route("/api/transactions/{id}/cancel", post(cancel_transaction))
        .route("/api/strategies", get(list_strategies))
        .with_state(state)
}
