use thiserror::Error;

/// 编排器错误类型定义
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("无效的意图: {0}")]
    InvalidIntent(String),

    #[error("编排策略未注册: {name}")]
    StrategyNotRegistered { name: String },

    #[error("编排策略 '{name}' 构造失败: {message}")]
    StrategyConstructionFailed { name: String, message: String },

    #[error("协议网关错误: {0}")]
    GatewayFailure(String),

    #[error("交易未找到: {id}")]
    TransactionNotFound { id: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl OrchestratorError {
    pub fn invalid_intent<S: Into<String>>(msg: S) -> Self {
        Self::InvalidIntent(msg.into())
    }

    pub fn strategy_not_registered<S: Into<String>>(name: S) -> Self {
        Self::StrategyNotRegistered { name: name.into() }
    }

    pub fn construction_failed<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::StrategyConstructionFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn gateway<S: Into<String>>(msg: S) -> Self {
        Self::GatewayFailure(msg.into())
    }

    pub fn transaction_not_found<S: Into<String>>(id: S) -> Self {
        Self::TransactionNotFound { id: id.into() }
    }

    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// 由调用方输入引起的错误，对外映射为客户端错误
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIntent(_) | Self::TransactionNotFound { .. }
        )
    }

    /// 错误类型代码，用于日志和诊断
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIntent(_) => "INVALID_INTENT",
            Self::StrategyNotRegistered { .. } => "STRATEGY_NOT_REGISTERED",
            Self::StrategyConstructionFailed { .. } => "STRATEGY_CONSTRUCTION_FAILED",
            Self::GatewayFailure(_) => "GATEWAY_FAILURE",
            Self::TransactionNotFound { .. } => "TRANSACTION_NOT_FOUND",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
