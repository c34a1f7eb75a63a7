#[cfg(test)]
pub mod mocks {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use orchestrator_core::{OrchestratorError, OrchestratorResult};
    use orchestrator_domain::{
        ExecutionOutcome, ExecutionStrategy, Intent, Parameters, ProtocolGateway,
    };
    use serde_json::{json, Value};

    use crate::registry::StrategyConstructor;

    /// 只返回自身名称的策略，用于检查注册表解析到了哪个构造函数
    pub struct LabelledStrategy {
        label: String,
    }

    #[async_trait]
    impl ExecutionStrategy for LabelledStrategy {
        fn name(&self) -> &str {
            &self.label
        }

        async fn execute(&self, _intent: &Intent) -> OrchestratorResult<ExecutionOutcome> {
            Ok(ExecutionOutcome::completed(
                "labelled",
                "search_completed",
                json!({}),
            ))
        }
    }

    pub fn labelled_constructor(label: &str) -> StrategyConstructor {
        let label = label.to_string();
        Arc::new(move || {
            let strategy: Arc<dyn ExecutionStrategy> = Arc::new(LabelledStrategy {
                label: label.clone(),
            });
            Ok(strategy)
        })
    }

    /// 执行成功但结果不带交易ID的策略
    pub struct UnkeyedStrategy;

    #[async_trait]
    impl ExecutionStrategy for UnkeyedStrategy {
        fn name(&self) -> &str {
            "unkeyed"
        }

        async fn execute(&self, _intent: &Intent) -> OrchestratorResult<ExecutionOutcome> {
            Ok(ExecutionOutcome::completed("", "selection_completed", json!({})))
        }
    }

    pub fn unkeyed_constructor() -> StrategyConstructor {
        Arc::new(|| {
            let strategy: Arc<dyn ExecutionStrategy> = Arc::new(UnkeyedStrategy);
            Ok(strategy)
        })
    }

    pub fn failing_constructor() -> StrategyConstructor {
        Arc::new(|| Err(OrchestratorError::internal("missing credentials")))
    }

    /// 记录调用并返回固定交易ID的网关
    pub struct StubGateway {
        transaction_id: String,
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubGateway {
        pub fn new(transaction_id: &str) -> Self {
            Self {
                transaction_id: transaction_id.to_string(),
                fail_on: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_on(mut self, action: &'static str) -> Self {
            self.fail_on = Some(action);
            self
        }

        pub fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn respond(&self, action: &str, domain: &str, body: Value) -> OrchestratorResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((action.to_string(), domain.to_string()));

            if self.fail_on == Some(action) {
                return Err(OrchestratorError::gateway(format!("{action} timed out")));
            }

            let mut response = json!({"transactionId": self.transaction_id});
            if let (Value::Object(target), Value::Object(extra)) = (&mut response, body) {
                target.extend(extra);
            }
            Ok(response)
        }
    }

    #[async_trait]
    impl ProtocolGateway for StubGateway {
        async fn search(&self, domain: &str, _parameters: &Parameters) -> OrchestratorResult<Value> {
            self.respond("search", domain, json!({"options": [{"provider": "Uber"}]}))
        }

        async fn select(&self, domain: &str, _parameters: &Parameters) -> OrchestratorResult<Value> {
            self.respond("select", domain, json!({"order": {"id": "o1"}}))
        }

        async fn init(&self, domain: &str, _parameters: &Parameters) -> OrchestratorResult<Value> {
            self.respond("init", domain, json!({"order": {"id": "o1", "payment": {}}}))
        }

        async fn confirm(&self, domain: &str, _parameters: &Parameters) -> OrchestratorResult<Value> {
            self.respond("confirm", domain, json!({"order": {"id": "o1", "state": "CONFIRMED"}}))
        }
    }
}
