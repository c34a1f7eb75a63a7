use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use orchestrator_api::{create_app, AppState};
use orchestrator_core::AppConfig;
use orchestrator_dispatcher::{builtin_registry, DispatchPipeline, StrategyFactory};
use orchestrator_domain::{IntentSource, ProtocolGateway, TransactionStore};
use orchestrator_infrastructure::{
    EvictionConfig, EvictionService, InMemoryTransactionTracker, KeywordIntentMapper,
    SimulatedGateway,
};
use tokio::{net::TcpListener, sync::broadcast, sync::Mutex};
use tracing::{info, warn};

/// 主应用程序：组装网关、策略注册表、交易追踪器和 HTTP 接口
pub struct Application {
    config: AppConfig,
    pipeline: Arc<DispatchPipeline>,
    intent_source: Arc<dyn IntentSource>,
    eviction: Mutex<EvictionService>,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化编排服务");

        let gateway: Arc<dyn ProtocolGateway> = Arc::new(
            SimulatedGateway::new(&config.gateway)
                .with_latency(Duration::from_millis(config.gateway.simulated_latency_ms)),
        );

        let registry = Arc::new(builtin_registry(gateway).await);
        let factory = Arc::new(StrategyFactory::new(registry.clone(), &config.orchestrator));

        let selected = factory.selected_strategy().to_string();
        if registry.is_registered(&selected).await {
            info!(strategy = %selected, "选用编排策略");
        } else {
            warn!(
                strategy = %selected,
                default = registry.default_name(),
                "选定的编排策略未注册，请求将使用默认策略"
            );
        }

        let store: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactionTracker::new());
        let pipeline = Arc::new(DispatchPipeline::new(factory, store.clone()));

        let intent_source: Arc<dyn IntentSource> =
            Arc::new(KeywordIntentMapper::new().context("创建意图映射器失败")?);

        let eviction = EvictionService::new(store, EvictionConfig::from(&config.lifecycle));

        Ok(Self {
            config,
            pipeline,
            intent_source,
            eviction: Mutex::new(eviction),
        })
    }

    pub fn pipeline(&self) -> &Arc<DispatchPipeline> {
        &self.pipeline
    }

    /// 构建 HTTP 路由
    pub fn router(&self) -> Router {
        let state = AppState {
            pipeline: Arc::clone(&self.pipeline),
            intent_source: Arc::clone(&self.intent_source),
        };
        create_app(state, &self.config.api)
    }

    /// 运行到收到关闭信号为止
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        self.serve(listener, shutdown_rx).await
    }

    /// 在给定监听器上运行
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        self.eviction
            .lock()
            .await
            .start()
            .await
            .context("启动交易淘汰服务失败")?;

        let address = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| self.config.api.bind_address.clone());
        info!("API服务器启动在 http://{}", address);

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败");

        if let Err(e) = self.eviction.lock().await.stop().await {
            warn!("停止交易淘汰服务失败: {}", e);
        }

        info!("API服务器已停止");
        result
    }
}
