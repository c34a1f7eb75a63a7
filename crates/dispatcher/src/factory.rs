use std::sync::Arc;

use orchestrator_core::{OrchestratorConfig, OrchestratorResult};
use orchestrator_domain::ExecutionStrategy;
use tracing::debug;

use crate::registry::StrategyRegistry;

/// 读取配置中选定的策略名称并委托注册表构造
pub struct StrategyFactory {
    registry: Arc<StrategyRegistry>,
    selected: String,
}

impl StrategyFactory {
    pub fn new(registry: Arc<StrategyRegistry>, config: &OrchestratorConfig) -> Self {
        Self::with_selected(registry, config.selected_strategy())
    }

    pub fn with_selected<S: Into<String>>(registry: Arc<StrategyRegistry>, selected: S) -> Self {
        Self {
            registry,
            selected: selected.into(),
        }
    }

    pub fn selected_strategy(&self) -> &str {
        &self.selected
    }

    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// 构造配置中选定的策略
    pub async fn create_selected(&self) -> OrchestratorResult<Arc<dyn ExecutionStrategy>> {
        self.create(&self.selected).await
    }

    pub async fn create(&self, name: &str) -> OrchestratorResult<Arc<dyn ExecutionStrategy>> {
        debug!(strategy = %name, "Creating strategy");
        self.registry.resolve(name, true).await
    }

    pub async fn list_available(&self) -> Vec<String> {
        let mut names = self.registry.list().await;
        names.sort();
        names
    }
}
