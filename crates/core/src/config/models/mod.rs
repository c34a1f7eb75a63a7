pub mod api_observability;
pub mod app_config;
pub mod orchestrator;

pub use api_observability::{ApiConfig, ObservabilityConfig};
pub use app_config::AppConfig;
pub use orchestrator::{
    GatewayConfig, LifecycleConfig, OrchestratorConfig, DEFAULT_STRATEGY, STRATEGY_ENV_VAR,
};
