use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// 优雅关闭管理器
///
/// 关闭之后再订阅的接收器会立即收到信号。
#[derive(Clone)]
pub struct ShutdownManager {
    /// 关闭后置为 None
    shutdown_tx: Arc<Mutex<Option<broadcast::Sender<()>>>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
        }
    }

    /// 订阅关闭信号
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        let guard = match self.shutdown_tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match guard.as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = broadcast::channel(1);
                let _ = tx.send(());
                rx
            }
        }
    }

    /// 触发关闭，重复调用无效果
    pub fn shutdown(&self) {
        let mut guard = match self.shutdown_tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Shutdown lock poisoned, continuing");
                poisoned.into_inner()
            }
        };

        let Some(tx) = guard.take() else {
            debug!("Shutdown already triggered");
            return;
        };

        debug!("Sending shutdown signal to {} subscribers", tx.receiver_count());
        let _ = tx.send(());
        info!("Shutdown signal sent");
    }

    pub fn is_shutdown(&self) -> bool {
        match self.shutdown_tx.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// 等待关闭信号
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.subscribe();
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_shutdown_manager_basic() {
        let manager = ShutdownManager::new();
        assert!(!manager.is_shutdown());

        let mut rx = manager.subscribe();
        manager.shutdown();

        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(result.is_ok());
        assert!(manager.is_shutdown());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let manager = ShutdownManager::new();
        let mut receivers: Vec<_> = (0..3).map(|_| manager.subscribe()).collect();

        manager.shutdown();

        for rx in receivers.iter_mut() {
            let result = timeout(Duration::from_millis(100), rx.recv()).await;
            assert!(matches!(result, Ok(Ok(()))));
        }
    }

    #[tokio::test]
    async fn test_subscribe_after_shutdown() {
        let manager = ShutdownManager::new();
        manager.shutdown();

        let mut rx = manager.subscribe();
        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_double_shutdown() {
        let manager = ShutdownManager::new();

        manager.shutdown();
        manager.shutdown();
        assert!(manager.is_shutdown());
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_from_clone() {
        let manager = ShutdownManager::new();
        let waiter = manager.clone();
        let handle = tokio::spawn(async move { waiter.wait_for_shutdown().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        manager.shutdown();

        let result = timeout(Duration::from_millis(100), handle).await;
        assert!(result.is_ok());
    }
}
