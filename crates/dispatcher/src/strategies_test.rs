#[cfg(test)]
mod strategies_tests {
    use std::sync::Arc;

    use crate::strategies::*;
    use crate::test_utils::mocks::StubGateway;
    use orchestrator_core::OrchestratorError;
    use orchestrator_domain::{ExecutionStrategy, Intent, OutcomeStatus, ProtocolGateway};

    fn gateway() -> Arc<StubGateway> {
        Arc::new(StubGateway::new("t1"))
    }

    #[tokio::test]
    async fn test_workflow_maps_operations_to_states() {
        let gateway = gateway();
        let strategy = WorkflowStrategy::new(gateway.clone());

        let expected = [
            ("search", "search_completed", "beckn_search"),
            ("select", "selection_completed", "beckn_select"),
            ("init", "initialization_completed", "beckn_init"),
            ("confirm", "confirmation_completed", "beckn_confirm"),
        ];

        for (operation, state, tool) in expected {
            let intent = Intent::new("mobility", operation).with_parameter("transactionId", "t1");
            let outcome = strategy.execute(&intent).await.unwrap();

            assert_eq!(outcome.status, OutcomeStatus::Completed);
            assert_eq!(outcome.transaction_id, "t1");
            assert_eq!(outcome.state, state);
            assert_eq!(outcome.extensions["tool"], tool);
            assert_eq!(outcome.extensions["strategy"], "workflow");
        }

        let actions: Vec<String> = gateway.calls().into_iter().map(|(action, _)| action).collect();
        assert_eq!(actions, vec!["search", "select", "init", "confirm"]);
    }

    #[tokio::test]
    async fn test_workflow_rejects_unknown_operation() {
        let gateway = gateway();
        let strategy = WorkflowStrategy::new(gateway.clone());

        let err = strategy
            .execute(&Intent::new("mobility", "track"))
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::GatewayFailure(ref msg) if msg == "Unsupported operation: track"));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_direct_strategy_calls_gateway() {
        let gateway = gateway();
        let strategy = DirectStrategy::new(gateway.clone());

        let outcome = strategy
            .execute(&Intent::new("retail", "select"))
            .await
            .unwrap();
        assert_eq!(outcome.state, "selection_completed");
        assert_eq!(outcome.results["order"]["id"], "o1");
        assert_eq!(outcome.extensions["strategy"], "direct");
        assert!(!outcome.extensions.contains_key("tool"));
        assert_eq!(gateway.calls(), vec![("select".to_string(), "retail".to_string())]);
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let gateway: Arc<dyn ProtocolGateway> = Arc::new(StubGateway::new("t1").failing_on("init"));
        let strategy = DirectStrategy::new(gateway);

        let err = strategy
            .execute(&Intent::new("food", "init"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::GatewayFailure(_)));
    }

    #[tokio::test]
    async fn test_response_without_transaction_id_fails() {
        let gateway: Arc<dyn ProtocolGateway> = Arc::new(StubGateway::new(""));
        let strategy = WorkflowStrategy::new(gateway);

        let err = strategy
            .execute(&Intent::new("mobility", "search"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::GatewayFailure(_)));
    }

    #[tokio::test]
    async fn test_builtin_registry() {
        let registry = builtin_registry(gateway()).await;

        assert_eq!(registry.default_name(), WORKFLOW_STRATEGY);
        assert_eq!(
            registry.resolve(DIRECT_STRATEGY, false).await.unwrap().name(),
            "direct"
        );
        assert_eq!(
            registry.resolve("unknown", true).await.unwrap().name(),
            "workflow"
        );
    }

    #[test]
    fn test_gateway_action_lookup() {
        assert_eq!(GatewayAction::from_operation("init"), Some(GatewayAction::Init));
        assert_eq!(GatewayAction::from_operation("cancel"), None);
        assert_eq!(GatewayAction::Confirm.completed_state(), "confirmation_completed");
    }
}
