use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::ApiResult, routes::AppState};

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let transactions = state.pipeline.store().count().await?;

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "beckn-orchestrator",
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": state.pipeline.factory().selected_strategy(),
        "transactions": transactions
    })))
}
