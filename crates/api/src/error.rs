use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orchestrator_core::OrchestratorError;
use serde_json::json;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("验证错误: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Orchestrator(OrchestratorError::TransactionNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Orchestrator(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Orchestrator(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Orchestrator(e) => e.kind(),
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 对外展示的错误信息，内部错误细节只写日志
    fn public_message(&self) -> String {
        match self {
            ApiError::Orchestrator(
                OrchestratorError::Internal(_)
                | OrchestratorError::Serialization(_)
                | OrchestratorError::StrategyConstructionFailed { .. },
            )
            | ApiError::Internal(_) => "Internal server error".to_string(),
            ApiError::Validation(errors) => {
                let details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect();
                        format!("{}: {}", field, messages.join(", "))
                    })
                    .collect();
                format!("请求参数验证失败: {}", details.join("; "))
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            debug!(kind = self.kind(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "status": "error",
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
