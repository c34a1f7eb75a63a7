use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use orchestrator_core::{OrchestratorError, OrchestratorResult, DEFAULT_STRATEGY};
use orchestrator_domain::{
    operation, response_transaction_id, ExecutionOutcome, ExecutionStrategy, Intent, Parameters,
    ProtocolGateway,
};

use crate::registry::{StrategyConstructor, StrategyRegistry};

pub const WORKFLOW_STRATEGY: &str = DEFAULT_STRATEGY;
pub const DIRECT_STRATEGY: &str = "direct";

/// 网关上的四个协议动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayAction {
    Search,
    Select,
    Init,
    Confirm,
}

impl GatewayAction {
    pub fn from_operation(name: &str) -> Option<Self> {
        match name {
            operation::SEARCH => Some(Self::Search),
            operation::SELECT => Some(Self::Select),
            operation::INIT => Some(Self::Init),
            operation::CONFIRM => Some(Self::Confirm),
            _ => None,
        }
    }

    /// 动作成功后的工作流状态标签
    pub fn completed_state(&self) -> &'static str {
        match self {
            Self::Search => "search_completed",
            Self::Select => "selection_completed",
            Self::Init => "initialization_completed",
            Self::Confirm => "confirmation_completed",
        }
    }

    pub async fn invoke(
        &self,
        gateway: &dyn ProtocolGateway,
        domain: &str,
        parameters: &Parameters,
    ) -> OrchestratorResult<Value> {
        match self {
            Self::Search => gateway.search(domain, parameters).await,
            Self::Select => gateway.select(domain, parameters).await,
            Self::Init => gateway.init(domain, parameters).await,
            Self::Confirm => gateway.confirm(domain, parameters).await,
        }
    }
}

/// 工作流中的一个工具
#[derive(Debug, Clone)]
pub struct WorkflowTool {
    pub name: &'static str,
    pub operation: &'static str,
    pub action: GatewayAction,
}

fn default_tools() -> Vec<WorkflowTool> {
    vec![
        WorkflowTool {
            name: "beckn_search",
            operation: operation::SEARCH,
            action: GatewayAction::Search,
        },
        WorkflowTool {
            name: "beckn_select",
            operation: operation::SELECT,
            action: GatewayAction::Select,
        },
        WorkflowTool {
            name: "beckn_init",
            operation: operation::INIT,
            action: GatewayAction::Init,
        },
        WorkflowTool {
            name: "beckn_confirm",
            operation: operation::CONFIRM,
            action: GatewayAction::Confirm,
        },
    ]
}

fn outcome_from_response(
    action: GatewayAction,
    response: Value,
    strategy: &str,
) -> OrchestratorResult<ExecutionOutcome> {
    let transaction_id = response_transaction_id(&response)?;
    Ok(
        ExecutionOutcome::completed(transaction_id, action.completed_state(), response)
            .with_extension("strategy", strategy),
    )
}

/// 默认策略：按操作查工具表，再由工具调用网关
pub struct WorkflowStrategy {
    gateway: Arc<dyn ProtocolGateway>,
    tools: Vec<WorkflowTool>,
}

impl WorkflowStrategy {
    pub fn new(gateway: Arc<dyn ProtocolGateway>) -> Self {
        Self {
            gateway,
            tools: default_tools(),
        }
    }

    pub fn tools(&self) -> &[WorkflowTool] {
        &self.tools
    }

    fn tool_for(&self, operation: &str) -> Option<&WorkflowTool> {
        self.tools.iter().find(|tool| tool.operation == operation)
    }
}

#[async_trait]
impl ExecutionStrategy for WorkflowStrategy {
    fn name(&self) -> &str {
        WORKFLOW_STRATEGY
    }

    async fn execute(&self, intent: &Intent) -> OrchestratorResult<ExecutionOutcome> {
        let tool = self.tool_for(&intent.operation).ok_or_else(|| {
            OrchestratorError::gateway(format!("Unsupported operation: {}", intent.operation))
        })?;

        info!(
            domain = %intent.domain,
            operation = %intent.operation,
            tool = tool.name,
            "Executing workflow tool"
        );

        let response = tool
            .action
            .invoke(self.gateway.as_ref(), &intent.domain, &intent.parameters)
            .await?;

        let outcome = outcome_from_response(tool.action, response, WORKFLOW_STRATEGY)?
            .with_extension("tool", tool.name);
        debug!(transaction_id = %outcome.transaction_id, state = %outcome.state, "Workflow tool completed");
        Ok(outcome)
    }
}

/// 直接调用网关，不经过工具表
pub struct DirectStrategy {
    gateway: Arc<dyn ProtocolGateway>,
}

impl DirectStrategy {
    pub fn new(gateway: Arc<dyn ProtocolGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ExecutionStrategy for DirectStrategy {
    fn name(&self) -> &str {
        DIRECT_STRATEGY
    }

    async fn execute(&self, intent: &Intent) -> OrchestratorResult<ExecutionOutcome> {
        let action = GatewayAction::from_operation(&intent.operation).ok_or_else(|| {
            OrchestratorError::gateway(format!("Unsupported operation: {}", intent.operation))
        })?;

        info!(domain = %intent.domain, operation = %intent.operation, "Executing gateway call");

        let response = action
            .invoke(self.gateway.as_ref(), &intent.domain, &intent.parameters)
            .await?;
        outcome_from_response(action, response, DIRECT_STRATEGY)
    }
}

pub fn workflow_constructor(gateway: Arc<dyn ProtocolGateway>) -> StrategyConstructor {
    Arc::new(move || {
        let strategy: Arc<dyn ExecutionStrategy> = Arc::new(WorkflowStrategy::new(gateway.clone()));
        Ok(strategy)
    })
}

pub fn direct_constructor(gateway: Arc<dyn ProtocolGateway>) -> StrategyConstructor {
    Arc::new(move || {
        let strategy: Arc<dyn ExecutionStrategy> = Arc::new(DirectStrategy::new(gateway.clone()));
        Ok(strategy)
    })
}

/// 创建以 workflow 为默认策略、并注册全部内置策略的注册表
pub async fn builtin_registry(gateway: Arc<dyn ProtocolGateway>) -> StrategyRegistry {
    let registry = StrategyRegistry::new(WORKFLOW_STRATEGY, workflow_constructor(gateway.clone()));
    registry
        .register(DIRECT_STRATEGY, direct_constructor(gateway))
        .await;
    registry
}
