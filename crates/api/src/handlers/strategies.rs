use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::{error::ApiResult, response::success, routes::AppState};

/// 列出已注册的编排策略
pub async fn list_strategies(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let factory = state.pipeline.factory();

    Ok(success(json!({
        "selected": factory.selected_strategy(),
        "default": factory.registry().default_name(),
        "available": factory.list_available().await,
    })))
}
