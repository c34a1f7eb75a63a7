use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_enabled: bool,
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            cors_enabled: true,
            request_timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_address.is_empty() {
            return Err(anyhow::anyhow!("API绑定地址不能为空"));
        }

        if !self.bind_address.contains(':') {
            return Err(anyhow::anyhow!(
                "API绑定地址格式无效，应为 host:port 格式: {}",
                self.bind_address
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// "json" 或 "pretty"
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(anyhow::anyhow!(
                "无效的日志级别: {}，支持的级别: {:?}",
                self.log_level,
                valid_levels
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(anyhow::anyhow!(
                "无效的日志格式: {}，支持的格式: {:?}",
                self.log_format,
                valid_formats
            ));
        }

        Ok(())
    }
}
