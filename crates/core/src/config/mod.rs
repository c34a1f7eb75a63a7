//! 配置管理
//!
//! 配置按以下顺序合并，后者覆盖前者：
//!
//! 1. 各配置段的内置默认值
//! 2. TOML 配置文件（`--config` 指定，或 `config/orchestrator.toml` 等默认路径）
//! 3. `ORCHESTRATOR_` 前缀的环境变量，嵌套键以 `__` 分隔
//!
//! ```toml
//! [orchestrator]
//! strategy = "workflow"
//!
//! [lifecycle]
//! retention_hours = 24
//! eviction_interval_seconds = 3600
//!
//! [gateway]
//! simulated_latency_ms = 500
//!
//! [api]
//! bind_address = "0.0.0.0:3000"
//! ```

pub mod models;

pub use models::*;
