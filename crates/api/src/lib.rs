//! # Orchestrator API
//!
//! 编排器的 HTTP 接口，基于 Axum 构建。
//!
//! ## API 端点
//!
//! - `POST /mcp/v1` - 自然语言请求入口，返回执行结果和会话上下文
//! - `GET /health` - 健康检查
//! - `GET /api/transactions` - 交易列表（可选 `domain`、`state` 过滤）
//! - `GET /api/transactions/{id}` - 交易详情
//! - `DELETE /api/transactions/{id}` - 删除交易
//! - `POST /api/transactions/{id}/cancel` - 取消交易
//! - `GET /api/strategies` - 已注册的编排策略
//!
//! ## 响应格式
//!
//! `/mcp/v1` 成功时：
//!
//! ```json
//! {
//!   "status": "success",
//!   "data": { "status": "completed", "transaction_id": "txn_...", "state": "search_completed", "results": {} },
//!   "conversation_context": { "transaction_id": "txn_...", "domain": "mobility", "state": "search_completed" }
//! }
//! ```
//!
//! 失败时统一为 `{"status": "error", "message": "..."}`，客户端错误返回 4xx，内部错误返回 500。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;

use axum::Router;
use orchestrator_core::ApiConfig;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, timeout_layer, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, api_config: &ApiConfig) -> Router {
    let mut app = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(timeout_layer(api_config.request_timeout_seconds))
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if api_config.cors_enabled {
        app = app.layer(cors_layer());
    }

    app
}
