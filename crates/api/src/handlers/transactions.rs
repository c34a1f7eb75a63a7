use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use orchestrator_core::OrchestratorError;
use orchestrator_domain::{TransactionRecord, TransactionState};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    error::ApiResult,
    response::success,
    routes::AppState,
    validation::validate_state_filter,
};

/// 交易查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct TransactionQueryParams {
    pub domain: Option<String>,
    #[validate(custom(function = "validate_state_filter"))]
    pub state: Option<String>,
}

/// 获取交易列表，可按领域和状态过滤，按创建时间升序
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionQueryParams>,
) -> ApiResult<impl IntoResponse> {
    params.validate()?;

    let store = state.pipeline.store();
    let mut records = match (&params.domain, &params.state) {
        (Some(domain), _) => store.list_by_domain(domain).await?,
        (None, Some(label)) => store.list_by_state(&TransactionState::from(label.as_str())).await?,
        (None, None) => store.list().await?,
    };

    if let (Some(_), Some(label)) = (&params.domain, &params.state) {
        let wanted = TransactionState::from(label.as_str());
        records.retain(|record| record.state == wanted);
    }
    records.sort_by_key(|record| record.created_at);

    Ok(success(records))
}

/// 获取交易详情
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record: TransactionRecord = state
        .pipeline
        .store()
        .get(&id)
        .await?
        .ok_or_else(|| OrchestratorError::transaction_not_found(&id))?;

    Ok(success(record))
}

/// 删除交易
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !state.pipeline.store().delete(&id).await? {
        return Err(OrchestratorError::transaction_not_found(&id).into());
    }

    info!(transaction_id = %id, "Transaction deleted");
    Ok(success(json!({ "deleted": id })))
}

/// 取消交易
pub async fn cancel_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record = state.pipeline.cancel(&id).await?;
    Ok(success(record))
}
