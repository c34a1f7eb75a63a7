use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    orchestrator::{GatewayConfig, LifecycleConfig, OrchestratorConfig},
};

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub orchestrator: OrchestratorConfig,
    pub lifecycle: LifecycleConfig,
    pub gateway: GatewayConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: ORCHESTRATOR_, nested keys separated by `__`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = [
                "config/orchestrator.toml",
                "orchestrator.toml",
                "/etc/orchestrator/config.toml",
            ];

            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        // e.g. ORCHESTRATOR_API__BIND_ADDRESS=127.0.0.1:8080
        builder = builder.add_source(
            Environment::with_prefix("ORCHESTRATOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.orchestrator
            .validate()
            .context("编排器配置验证失败")?;
        self.lifecycle.validate().context("生命周期配置验证失败")?;
        self.gateway.validate().context("网关配置验证失败")?;
        self.api.validate().context("API配置验证失败")?;
        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }
}
