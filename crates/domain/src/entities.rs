use std::fmt;

use chrono::{DateTime, Utc};
use orchestrator_core::{OrchestratorError, OrchestratorResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// 自由格式的参数表
pub type Parameters = serde_json::Map<String, Value>;

/// 常用操作名称。操作是开放集合，这里只列出内置策略理解的部分
pub mod operation {
    pub const CREATE: &str = "create";
    pub const SEARCH: &str = "search";
    pub const SELECT: &str = "select";
    pub const INIT: &str = "init";
    pub const CONFIRM: &str = "confirm";
    pub const CANCEL: &str = "cancel";
    pub const STATUS: &str = "status";
    pub const UPDATE: &str = "update";
}

/// 结构化意图，由外部意图源从自然语言请求中提取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub domain: String,
    pub operation: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub context: Parameters,
}

impl Intent {
    pub fn new<D: Into<String>, O: Into<String>>(domain: D, operation: O) -> Self {
        Self {
            domain: domain.into(),
            operation: operation.into(),
            parameters: Parameters::new(),
            context: Parameters::new(),
        }
    }

    pub fn with_parameter<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_context<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// 拒绝缺少领域或操作的意图
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.domain.trim().is_empty() {
            return Err(OrchestratorError::invalid_intent("意图缺少领域(domain)"));
        }
        if self.operation.trim().is_empty() {
            return Err(OrchestratorError::invalid_intent("意图缺少操作(operation)"));
        }
        Ok(())
    }

    /// 意图关联的交易ID，按 parameters.transactionId、parameters.transaction_id、
    /// context.transaction_id 的顺序查找
    pub fn transaction_id(&self) -> Option<&str> {
        self.parameters
            .get("transactionId")
            .or_else(|| self.parameters.get("transaction_id"))
            .or_else(|| self.context.get("transaction_id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Completed,
    Pending,
    Failed,
}

/// 编排策略的执行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: OutcomeStatus,
    pub results: Value,
    pub transaction_id: String,
    /// 工作流状态标签，如 "search_completed"
    pub state: String,
    /// 策略自定义的扩展字段
    #[serde(flatten)]
    pub extensions: Parameters,
}

impl ExecutionOutcome {
    pub fn completed<T: Into<String>, S: Into<String>>(
        transaction_id: T,
        state: S,
        results: Value,
    ) -> Self {
        Self {
            status: OutcomeStatus::Completed,
            results,
            transaction_id: transaction_id.into(),
            state: state.into(),
            extensions: Parameters::new(),
        }
    }

    pub fn with_extension<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}

/// 交易生命周期状态
///
/// 已知状态之外的标签原样保存在 `Other` 中，追踪器不校验状态迁移是否合法。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionState {
    Created,
    SearchCompleted,
    SelectionCompleted,
    InitializationCompleted,
    ConfirmationCompleted,
    Cancelled,
    Failed,
    Other(String),
}

impl TransactionState {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionState::Created => "created",
            TransactionState::SearchCompleted => "search_completed",
            TransactionState::SelectionCompleted => "selection_completed",
            TransactionState::InitializationCompleted => "initialization_completed",
            TransactionState::ConfirmationCompleted => "confirmation_completed",
            TransactionState::Cancelled => "cancelled",
            TransactionState::Failed => "failed",
            TransactionState::Other(label) => label,
        }
    }
}

impl From<&str> for TransactionState {
    fn from(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "created" => TransactionState::Created,
            "search_completed" => TransactionState::SearchCompleted,
            "selection_completed" => TransactionState::SelectionCompleted,
            "initialization_completed" => TransactionState::InitializationCompleted,
            "confirmation_completed" => TransactionState::ConfirmationCompleted,
            "cancelled" => TransactionState::Cancelled,
            "failed" => TransactionState::Failed,
            _ => TransactionState::Other(label.to_string()),
        }
    }
}

impl From<String> for TransactionState {
    fn from(label: String) -> Self {
        TransactionState::from(label.as_str())
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(TransactionState::from(label))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub state: TransactionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// 交易记录的部分更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub state: Option<TransactionState>,
    pub results: Option<Value>,
    /// 合并到现有上下文
    pub context: Option<Parameters>,
    /// 写入历史条目的操作名，缺省为 "update"
    pub operation: Option<String>,
}

impl TransactionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state<S: Into<TransactionState>>(mut self, state: S) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn results(mut self, results: Value) -> Self {
        self.results = Some(results);
        self
    }

    pub fn context(mut self, context: Parameters) -> Self {
        self.context = Some(context);
        self
    }

    pub fn operation<S: Into<String>>(mut self, operation: S) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

/// 一次多步协商的交易记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub domain: String,
    pub state: TransactionState,
    pub context: Parameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new<D: Into<String>>(domain: D, context: Parameters) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), domain, context)
    }

    /// 使用网关分配的交易ID创建记录
    pub fn with_id<I: Into<String>, D: Into<String>>(id: I, domain: D, context: Parameters) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            domain: domain.into(),
            state: TransactionState::Created,
            context,
            results: None,
            history: vec![HistoryEntry {
                timestamp: now,
                operation: operation::CREATE.to_string(),
                state: TransactionState::Created,
                data: None,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    /// 以某次操作的结果开启一段协商
    ///
    /// 网关分配交易ID的那次操作即是记录的种子条目，不再额外写入 `created`。
    pub fn opened<I, D, O>(
        id: I,
        domain: D,
        context: Parameters,
        operation: O,
        state: TransactionState,
        results: Value,
    ) -> Self
    where
        I: Into<String>,
        D: Into<String>,
        O: Into<String>,
    {
        let mut record = Self::with_id(id, domain, context);
        record.history[0] = HistoryEntry {
            timestamp: record.created_at,
            operation: operation.into(),
            state: state.clone(),
            data: Some(results.clone()),
        };
        record.state = state;
        record.results = Some(results);
        record
    }

    /// 合并部分更新，返回状态是否发生变化
    ///
    /// `updated_at` 总是刷新；只有状态真正改变时才追加历史条目。
    pub fn apply(&mut self, update: TransactionUpdate, now: DateTime<Utc>) -> bool {
        let TransactionUpdate {
            state,
            results,
            context,
            operation: op,
        } = update;

        if let Some(context) = context {
            self.context.extend(context);
        }

        if let Some(results) = &results {
            self.results = Some(results.clone());
        }

        self.updated_at = now;

        match state {
            Some(state) if state != self.state => {
                self.history.push(HistoryEntry {
                    timestamp: now,
                    operation: op.unwrap_or_else(|| operation::UPDATE.to_string()),
                    state: state.clone(),
                    data: results,
                });
                self.state = state;
                true
            }
            _ => false,
        }
    }

    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.updated_at < cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_intent_validation() {
        assert!(Intent::new("mobility", "search").validate().is_ok());

        let err = Intent::new("", "search").validate().unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidIntent(_)));

        let err = Intent::new("mobility", "  ").validate().unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidIntent(_)));
    }

    #[test]
    fn test_intent_transaction_id_lookup() {
        let intent = Intent::new("mobility", "select").with_parameter("transactionId", "t1");
        assert_eq!(intent.transaction_id(), Some("t1"));

        let intent = Intent::new("mobility", "select").with_context("transaction_id", "t2");
        assert_eq!(intent.transaction_id(), Some("t2"));

        let intent = Intent::new("mobility", "search").with_parameter("transactionId", "");
        assert_eq!(intent.transaction_id(), None);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(
            TransactionState::from("search_completed"),
            TransactionState::SearchCompleted
        );
        assert_eq!(
            TransactionState::from("CONFIRMATION_COMPLETED"),
            TransactionState::ConfirmationCompleted
        );
        assert_eq!(
            TransactionState::from("awaiting_payment"),
            TransactionState::Other("awaiting_payment".to_string())
        );
        assert_eq!(TransactionState::Cancelled.to_string(), "cancelled");

        let json = serde_json::to_value(TransactionState::InitializationCompleted).unwrap();
        assert_eq!(json, json!("initialization_completed"));
    }

    #[test]
    fn test_new_record_has_seed_history() {
        let record = TransactionRecord::new("retail", Parameters::new());
        assert_eq!(record.state, TransactionState::Created);
        assert_eq!(record.history.len(), 1);
        assert_eq!(record.history[0].operation, "create");
        assert_eq!(record.created_at, record.updated_at);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_opened_record_seeds_with_first_outcome() {
        let record = TransactionRecord::opened(
            "t1",
            "mobility",
            Parameters::new(),
            "search",
            TransactionState::SearchCompleted,
            json!({"options": []}),
        );
        assert_eq!(record.id, "t1");
        assert_eq!(record.state, TransactionState::SearchCompleted);
        assert_eq!(record.history.len(), 1);
        assert_eq!(record.history[0].operation, "search");
        assert_eq!(record.history[0].state, TransactionState::SearchCompleted);
        assert_eq!(record.results, Some(json!({"options": []})));
    }

    #[test]
    fn test_apply_appends_history_only_on_state_change() {
        let mut record = TransactionRecord::with_id("t1", "mobility", Parameters::new());
        let now = Utc::now() + Duration::seconds(5);

        let changed = record.apply(
            TransactionUpdate::new()
                .state(TransactionState::SearchCompleted)
                .results(json!({"options": []}))
                .operation("search"),
            now,
        );
        assert!(changed);
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.history[1].operation, "search");
        assert_eq!(record.history[1].data, Some(json!({"options": []})));
        assert_eq!(record.updated_at, now);

        let later = now + Duration::seconds(5);
        let changed = record.apply(
            TransactionUpdate::new().state(TransactionState::SearchCompleted),
            later,
        );
        assert!(!changed);
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn test_apply_merges_context_and_replaces_results() {
        let mut context = Parameters::new();
        context.insert("user_id".to_string(), json!("u1"));
        let mut record = TransactionRecord::with_id("t1", "food", context);

        let mut extra = Parameters::new();
        extra.insert("conversation_id".to_string(), json!("c1"));
        record.apply(
            TransactionUpdate::new()
                .context(extra)
                .results(json!({"a": 1})),
            Utc::now(),
        );
        record.apply(TransactionUpdate::new().results(json!({"b": 2})), Utc::now());

        assert_eq!(record.context.get("user_id"), Some(&json!("u1")));
        assert_eq!(record.context.get("conversation_id"), Some(&json!("c1")));
        assert_eq!(record.results, Some(json!({"b": 2})));
        assert_eq!(record.history.len(), 1);
    }

    #[test]
    fn test_permissive_transitions() {
        let mut record = TransactionRecord::with_id("t1", "mobility", Parameters::new());
        let changed = record.apply(
            TransactionUpdate::new().state(TransactionState::ConfirmationCompleted),
            Utc::now(),
        );
        assert!(changed);
        assert_eq!(record.state, TransactionState::ConfirmationCompleted);
    }

    #[test]
    fn test_outcome_serialization_flattens_extensions() {
        let outcome = ExecutionOutcome::completed("t1", "search_completed", json!({"x": 1}))
            .with_extension("strategy", "workflow");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], json!("completed"));
        assert_eq!(value["transaction_id"], json!("t1"));
        assert_eq!(value["strategy"], json!("workflow"));
    }
}
