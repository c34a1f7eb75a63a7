use chrono::{DateTime, Duration, Utc};
use orchestrator_core::{LifecycleConfig, OrchestratorResult};
use orchestrator_domain::TransactionStore;
use std::sync::Arc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// 交易淘汰配置
#[derive(Debug, Clone)]
pub struct EvictionConfig {
    /// 扫描间隔（秒）
    pub interval_seconds: u64,
    /// 最后更新时间早于 now - retention_hours 的交易会被删除
    pub retention_hours: i64,
    pub enabled: bool,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            retention_hours: 24,
            enabled: true,
        }
    }
}

impl From<&LifecycleConfig> for EvictionConfig {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            interval_seconds: config.eviction_interval_seconds,
            retention_hours: config.retention_hours,
            enabled: config.eviction_enabled,
        }
    }
}

/// 过期交易淘汰服务
///
/// 后台周期性删除长时间未更新的交易记录，防止内存无限增长
pub struct EvictionService {
    store: Arc<dyn TransactionStore>,
    config: EvictionConfig,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    eviction_handle: Option<tokio::task::JoinHandle<()>>,
}

impl EvictionService {
    pub fn new(store: Arc<dyn TransactionStore>, config: EvictionConfig) -> Self {
        Self {
            store,
            config,
            shutdown_tx: None,
            eviction_handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.eviction_handle.is_some()
    }

    /// 启动后台淘汰任务
    pub async fn start(&mut self) -> OrchestratorResult<()> {
        if !self.config.enabled {
            info!("Eviction service is disabled");
            return Ok(());
        }

        if self.is_running() {
            warn!("Eviction service already running");
            return Ok(());
        }

        info!("Starting eviction service with config: {:?}", self.config);

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let store = self.store.clone();
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let mut eviction_interval =
                interval(std::time::Duration::from_secs(config.interval_seconds));
            // 首个 tick 立即触发，跳过它，让第一次扫描发生在一个完整间隔之后
            eviction_interval.tick().await;

            loop {
                tokio::select! {
                    _ = eviction_interval.tick() => {
                        if let Err(e) = Self::perform_eviction(&store, &config, Utc::now()).await {
                            error!("Eviction failed: {}", e);
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("Eviction service shutdown requested");
                        break;
                    }
                }
            }
        });

        self.eviction_handle = Some(handle);
        info!("Eviction service started successfully");
        Ok(())
    }

    pub async fn stop(&mut self) -> OrchestratorResult<()> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.eviction_handle.take() {
            if let Err(e) = handle.await {
                warn!("Error waiting for eviction service to stop: {}", e);
            }
        }

        info!("Eviction service stopped");
        Ok(())
    }

    /// 立即执行一次淘汰
    pub async fn evict_once(&self) -> OrchestratorResult<EvictionStats> {
        self.evict_as_of(Utc::now()).await
    }

    /// 以给定时刻为"现在"执行一次淘汰
    pub async fn evict_as_of(&self, now: DateTime<Utc>) -> OrchestratorResult<EvictionStats> {
        if !self.config.enabled {
            return Ok(EvictionStats::default());
        }

        Self::perform_eviction(&self.store, &self.config, now).await
    }

    async fn perform_eviction(
        store: &Arc<dyn TransactionStore>,
        config: &EvictionConfig,
        now: DateTime<Utc>,
    ) -> OrchestratorResult<EvictionStats> {
        let start_time = std::time::Instant::now();
        let cutoff = now - Duration::hours(config.retention_hours);

        debug!("Evicting transactions not updated since {}", cutoff);

        let scanned = store.count().await?;
        let evicted = store.delete_updated_before(cutoff).await?;

        let stats = EvictionStats {
            scanned,
            evicted,
            duration: start_time.elapsed(),
        };

        if stats.has_evictions() {
            info!(
                "Eviction completed: {} of {} transactions removed in {:?}",
                stats.evicted, stats.scanned, stats.duration
            );
        } else {
            debug!("Eviction completed: nothing to remove ({} scanned)", stats.scanned);
        }

        Ok(stats)
    }
}

impl Drop for EvictionService {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct EvictionStats {
    pub scanned: usize,
    pub evicted: usize,
    pub duration: std::time::Duration,
}

impl EvictionStats {
    pub fn has_evictions(&self) -> bool {
        self.evicted > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::InMemoryTransactionTracker;
    use orchestrator_domain::Parameters;

    fn service_with(store: Arc<dyn TransactionStore>, enabled: bool) -> EvictionService {
        EvictionService::new(
            store,
            EvictionConfig {
                enabled,
                ..EvictionConfig::default()
            },
        )
    }

    #[test]
    fn test_eviction_config_default() {
        let config = EvictionConfig::default();
        assert_eq!(config.interval_seconds, 3600);
        assert_eq!(config.retention_hours, 24);
        assert!(config.enabled);
    }

    #[test]
    fn test_eviction_config_from_lifecycle() {
        let lifecycle = LifecycleConfig {
            retention_hours: 2,
            eviction_interval_seconds: 60,
            eviction_enabled: false,
        };
        let config = EvictionConfig::from(&lifecycle);
        assert_eq!(config.retention_hours, 2);
        assert_eq!(config.interval_seconds, 60);
        assert!(!config.enabled);
    }

    #[tokio::test]
    async fn test_recent_transaction_survives() {
        let store: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactionTracker::new());
        store.create("mobility", Parameters::new()).await.unwrap();

        let service = service_with(store.clone(), true);
        let stats = service.evict_once().await.unwrap();

        assert_eq!(stats.scanned, 1);
        assert_eq!(stats.evicted, 0);
        assert!(!stats.has_evictions());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transaction_older_than_retention_is_evicted() {
        let store: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactionTracker::new());
        let record = store.create("retail", Parameters::new()).await.unwrap();

        let service = service_with(store.clone(), true);
        let stats = service
            .evict_as_of(Utc::now() + Duration::hours(25))
            .await
            .unwrap();

        assert_eq!(stats.evicted, 1);
        assert!(store.get(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disabled_service_does_nothing() {
        let store: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactionTracker::new());
        store.create("food", Parameters::new()).await.unwrap();

        let mut service = service_with(store.clone(), false);
        service.start().await.unwrap();
        assert!(!service.is_running());

        let stats = service
            .evict_as_of(Utc::now() + Duration::hours(48))
            .await
            .unwrap();
        assert_eq!(stats.evicted, 0);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let store: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactionTracker::new());
        let mut service = service_with(store, true);

        service.start().await.unwrap();
        assert!(service.is_running());

        service.stop().await.unwrap();
        assert!(!service.is_running());
    }
}
