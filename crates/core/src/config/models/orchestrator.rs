use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 内置默认策略名称，注册表初始化时无条件注册
pub const DEFAULT_STRATEGY: &str = "workflow";

/// 兼容旧部署的策略选择环境变量
pub const STRATEGY_ENV_VAR: &str = "ORCHESTRATOR_TYPE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// 选用的编排策略名称（大小写不敏感）
    pub strategy: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// 最终生效的策略名称：`ORCHESTRATOR_TYPE` 优先
    pub fn selected_strategy(&self) -> String {
        self.resolve_strategy(std::env::var(STRATEGY_ENV_VAR).ok())
    }

    /// 环境变量值非空时覆盖配置中的策略名称
    pub fn resolve_strategy(&self, env_value: Option<String>) -> String {
        env_value
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.strategy.clone())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.strategy.trim().is_empty() {
            return Err(anyhow::anyhow!("编排策略名称不能为空"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// 交易记录保留时长（小时），超过后由后台淘汰
    pub retention_hours: i64,
    /// 淘汰扫描间隔（秒）
    pub eviction_interval_seconds: u64,
    pub eviction_enabled: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retention_hours: 24,
            eviction_interval_seconds: 3600,
            eviction_enabled: true,
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.retention_hours <= 0 {
            return Err(anyhow::anyhow!("交易保留时长必须大于0"));
        }
        if self.eviction_interval_seconds == 0 {
            return Err(anyhow::anyhow!("淘汰扫描间隔必须大于0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// 模拟网络往返延迟（毫秒），0 表示不延迟
    pub simulated_latency_ms: u64,
    /// 领域 -> 网关地址
    pub endpoints: HashMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let endpoints = [
            ("mobility", "https://beckn-mobility-gateway.example.com"),
            ("retail", "https://beckn-retail-gateway.example.com"),
            ("food", "https://beckn-food-gateway.example.com"),
        ]
        .into_iter()
        .map(|(domain, url)| (domain.to_string(), url.to_string()))
        .collect();

        Self {
            simulated_latency_ms: 500,
            endpoints,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoints.is_empty() {
            return Err(anyhow::anyhow!("至少需要配置一个网关地址"));
        }
        for (domain, url) in &self.endpoints {
            if domain.trim().is_empty() {
                return Err(anyhow::anyhow!("网关领域名称不能为空"));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("网关地址格式无效: {} -> {}", domain, url));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(strategy: &str) -> OrchestratorConfig {
        OrchestratorConfig {
            strategy: strategy.to_string(),
        }
    }

    #[test]
    fn test_env_value_overrides_configured_strategy() {
        let config = config("workflow");
        assert_eq!(config.resolve_strategy(Some("direct".to_string())), "direct");
        assert_eq!(config.resolve_strategy(Some(" direct\n".to_string())), "direct");
    }

    #[test]
    fn test_blank_or_missing_env_value_keeps_configured_strategy() {
        let config = config("direct");
        assert_eq!(config.resolve_strategy(Some("  ".to_string())), "direct");
        assert_eq!(config.resolve_strategy(Some(String::new())), "direct");
        assert_eq!(config.resolve_strategy(None), "direct");
    }

    #[test]
    fn test_blank_strategy_fails_validation() {
        assert!(config(" ").validate().is_err());
        assert!(config("workflow").validate().is_ok());
    }
}
