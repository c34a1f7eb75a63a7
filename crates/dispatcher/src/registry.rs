use std::collections::HashMap;
use std::sync::Arc;

use orchestrator_core::{OrchestratorError, OrchestratorResult};
use orchestrator_domain::ExecutionStrategy;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// 策略构造函数
pub type StrategyConstructor =
    Arc<dyn Fn() -> OrchestratorResult<Arc<dyn ExecutionStrategy>> + Send + Sync>;

/// 请求默认策略时可用的别名
pub const DEFAULT_ALIAS: &str = "default";

/// 按名称索引的编排策略注册表
///
/// 名称大小写不敏感。默认策略在创建时注册，之后可以被覆盖但不能被移除，
/// 因此允许回退的 `resolve` 只会在默认策略本身构造失败时出错。
pub struct StrategyRegistry {
    default_name: String,
    constructors: Arc<RwLock<HashMap<String, StrategyConstructor>>>,
}

impl StrategyRegistry {
    pub fn new<N: AsRef<str>>(default_name: N, default_constructor: StrategyConstructor) -> Self {
        let default_name = default_name.as_ref().to_lowercase();
        let mut constructors = HashMap::new();
        constructors.insert(default_name.clone(), default_constructor);

        info!("Strategy registry initialized with default strategy '{}'", default_name);

        Self {
            default_name,
            constructors: Arc::new(RwLock::new(constructors)),
        }
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// 注册或覆盖策略构造函数，后注册者生效
    pub async fn register<N: AsRef<str>>(&self, name: N, constructor: StrategyConstructor) {
        let name = self.normalize(name.as_ref());
        let mut constructors = self.constructors.write().await;
        if constructors.insert(name.clone(), constructor).is_some() {
            info!("Replaced strategy constructor '{}'", name);
        } else {
            info!("Registered strategy '{}'", name);
        }
    }

    /// 移除策略。默认策略不可移除
    pub async fn unregister<N: AsRef<str>>(&self, name: N) -> bool {
        let name = self.normalize(name.as_ref());
        if name == self.default_name {
            warn!("Refusing to unregister default strategy '{}'", name);
            return false;
        }
        self.constructors.write().await.remove(&name).is_some()
    }

    pub async fn is_registered<N: AsRef<str>>(&self, name: N) -> bool {
        let name = self.normalize(name.as_ref());
        self.constructors.read().await.contains_key(&name)
    }

    /// 按名称构造策略实例
    ///
    /// 请求的策略未注册或构造失败时，若 `allow_fallback` 为真且请求的不是默认策略，
    /// 改为构造默认策略一次；默认策略也失败则返回该错误。
    pub async fn resolve<N: AsRef<str>>(
        &self,
        name: N,
        allow_fallback: bool,
    ) -> OrchestratorResult<Arc<dyn ExecutionStrategy>> {
        let name = self.normalize(name.as_ref());

        match self.construct(&name).await {
            Ok(strategy) => Ok(strategy),
            Err(e) if allow_fallback && name != self.default_name => {
                match &e {
                    OrchestratorError::StrategyNotRegistered { .. } => warn!(
                        requested = %name,
                        fallback = %self.default_name,
                        "Strategy not registered, falling back to default"
                    ),
                    _ => error!(
                        requested = %name,
                        fallback = %self.default_name,
                        error = %e,
                        "Strategy construction failed, falling back to default"
                    ),
                }
                self.construct(&self.default_name).await.inspect_err(|e| {
                    error!(
                        strategy = %self.default_name,
                        error = %e,
                        "Default strategy construction failed"
                    )
                })
            }
            Err(e) => Err(e),
        }
    }

    /// 已注册的策略名称，顺序不保证稳定
    pub async fn list(&self) -> Vec<String> {
        self.constructors.read().await.keys().cloned().collect()
    }

    fn normalize(&self, name: &str) -> String {
        let name = name.trim().to_lowercase();
        if name == DEFAULT_ALIAS {
            self.default_name.clone()
        } else {
            name
        }
    }

    async fn construct(&self, name: &str) -> OrchestratorResult<Arc<dyn ExecutionStrategy>> {
        // 在锁外执行构造函数
        let constructor = self
            .constructors
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::strategy_not_registered(name))?;

        let strategy = constructor().map_err(|e| match e {
            OrchestratorError::StrategyConstructionFailed { .. } => e,
            other => OrchestratorError::construction_failed(name, other.to_string()),
        })?;

        debug!(strategy = %name, "Constructed strategy");
        Ok(strategy)
    }
}
