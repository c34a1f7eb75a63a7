use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orchestrator_core::{OrchestratorError, OrchestratorResult};
use orchestrator_domain::{
    Parameters, TransactionRecord, TransactionState, TransactionStore, TransactionUpdate,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 内存交易生命周期追踪器
///
/// 进程内唯一的交易记录所有者，由应用组合根创建并以 `Arc` 共享。
/// 调用方拿到的都是记录的克隆，不持有内部引用。
#[derive(Debug, Default)]
pub struct InMemoryTransactionTracker {
    transactions: Arc<RwLock<HashMap<String, TransactionRecord>>>,
}

impl InMemoryTransactionTracker {
    pub fn new() -> Self {
        info!("Transaction tracker initialized");
        Self {
            transactions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn filter_by<F>(&self, predicate: F) -> Vec<TransactionRecord>
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        let transactions = self.transactions.read().await;
        transactions
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionTracker {
    async fn create(&self, domain: &str, context: Parameters) -> OrchestratorResult<TransactionRecord> {
        let record = TransactionRecord::new(domain, context);

        let mut transactions = self.transactions.write().await;
        transactions.insert(record.id.clone(), record.clone());

        info!(transaction_id = %record.id, domain = %domain, "Created transaction");
        Ok(record)
    }

    async fn get_or_insert(&self, record: TransactionRecord) -> OrchestratorResult<(TransactionRecord, bool)> {
        if record.id.is_empty() {
            return Err(OrchestratorError::internal("交易ID不能为空"));
        }

        let mut transactions = self.transactions.write().await;
        if let Some(existing) = transactions.get(&record.id) {
            return Ok((existing.clone(), false));
        }

        info!(
            transaction_id = %record.id,
            domain = %record.domain,
            state = %record.state,
            "Opened transaction"
        );
        transactions.insert(record.id.clone(), record.clone());
        Ok((record, true))
    }

    async fn get(&self, id: &str) -> OrchestratorResult<Option<TransactionRecord>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(id).cloned())
    }

    async fn update(&self, id: &str, update: TransactionUpdate) -> OrchestratorResult<TransactionRecord> {
        let mut transactions = self.transactions.write().await;
        let record = transactions
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::transaction_not_found(id))?;

        let previous_state = record.state.clone();
        let changed = record.apply(update, Utc::now());

        info!(
            transaction_id = %id,
            previous_state = %previous_state,
            new_state = %record.state,
            state_changed = changed,
            "Updated transaction"
        );

        Ok(record.clone())
    }

    async fn list(&self) -> OrchestratorResult<Vec<TransactionRecord>> {
        Ok(self.filter_by(|_| true).await)
    }

    async fn list_by_domain(&self, domain: &str) -> OrchestratorResult<Vec<TransactionRecord>> {
        Ok(self.filter_by(|record| record.domain == domain).await)
    }

    async fn list_by_state(&self, state: &TransactionState) -> OrchestratorResult<Vec<TransactionRecord>> {
        Ok(self.filter_by(|record| &record.state == state).await)
    }

    async fn delete(&self, id: &str) -> OrchestratorResult<bool> {
        info!(transaction_id = %id, "Deleting transaction");
        let mut transactions = self.transactions.write().await;
        Ok(transactions.remove(id).is_some())
    }

    async fn delete_updated_before(&self, cutoff: DateTime<Utc>) -> OrchestratorResult<usize> {
        let mut transactions = self.transactions.write().await;
        let before = transactions.len();
        transactions.retain(|_, record| !record.is_stale(cutoff));
        let removed = before - transactions.len();

        debug!("Removed {} transactions last updated before {}", removed, cutoff);
        Ok(removed)
    }

    async fn count(&self) -> OrchestratorResult<usize> {
        Ok(self.transactions.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_get() {
        let tracker = InMemoryTransactionTracker::new();
        let created = tracker.create("mobility", Parameters::new()).await.unwrap();

        let fetched = tracker.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.state, TransactionState::Created);
        assert_eq!(fetched.history.len(), 1);
        assert_eq!(fetched.domain, "mobility");
    }

    #[tokio::test]
    async fn test_repeated_state_write_does_not_grow_history() {
        let tracker = InMemoryTransactionTracker::new();
        let created = tracker.create("retail", Parameters::new()).await.unwrap();

        let first = tracker
            .update(
                &created.id,
                TransactionUpdate::new().state(TransactionState::SearchCompleted),
            )
            .await
            .unwrap();
        assert_eq!(first.history.len(), 2);

        let second = tracker
            .update(
                &created.id,
                TransactionUpdate::new().state(TransactionState::SearchCompleted),
            )
            .await
            .unwrap();
        assert_eq!(second.history.len(), 2);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_state_change_appends_exactly_one_entry() {
        let tracker = InMemoryTransactionTracker::new();
        let created = tracker.create("food", Parameters::new()).await.unwrap();
        tracker
            .update(
                &created.id,
                TransactionUpdate::new().state(TransactionState::SearchCompleted),
            )
            .await
            .unwrap();

        let updated = tracker
            .update(
                &created.id,
                TransactionUpdate::new()
                    .state(TransactionState::SelectionCompleted)
                    .results(json!({"order": {"id": "o1"}})),
            )
            .await
            .unwrap();

        assert_eq!(updated.history.len(), 3);
        let last = updated.history.last().unwrap();
        assert_eq!(last.state, TransactionState::SelectionCompleted);
        assert_eq!(last.data, Some(json!({"order": {"id": "o1"}})));
        assert_eq!(updated.results, Some(json!({"order": {"id": "o1"}})));
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails_without_creating() {
        let tracker = InMemoryTransactionTracker::new();
        let err = tracker
            .update("missing", TransactionUpdate::new().state(TransactionState::Failed))
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::TransactionNotFound { ref id } if id == "missing"));
        assert!(tracker.get("missing").await.unwrap().is_none());
        assert_eq!(tracker.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_or_insert_keeps_existing_record() {
        let tracker = InMemoryTransactionTracker::new();
        let opened = TransactionRecord::opened(
            "t1",
            "mobility",
            Parameters::new(),
            "search",
            TransactionState::SearchCompleted,
            json!({"options": []}),
        );

        let (first, inserted) = tracker.get_or_insert(opened).await.unwrap();
        assert!(inserted);
        assert_eq!(first.id, "t1");

        let (second, inserted) = tracker
            .get_or_insert(TransactionRecord::with_id("t1", "retail", Parameters::new()))
            .await
            .unwrap();
        assert!(!inserted);
        assert_eq!(second.domain, "mobility");
        assert_eq!(second.state, TransactionState::SearchCompleted);
        assert_eq!(tracker.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_or_insert_rejects_empty_id() {
        let tracker = InMemoryTransactionTracker::new();
        let result = tracker
            .get_or_insert(TransactionRecord::with_id("", "food", Parameters::new()))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_and_delete() {
        let tracker = InMemoryTransactionTracker::new();
        let a = tracker.create("mobility", Parameters::new()).await.unwrap();
        let b = tracker.create("retail", Parameters::new()).await.unwrap();
        tracker
            .update(&b.id, TransactionUpdate::new().state(TransactionState::Cancelled))
            .await
            .unwrap();

        assert_eq!(tracker.list().await.unwrap().len(), 2);
        assert_eq!(tracker.list_by_domain("mobility").await.unwrap().len(), 1);
        let cancelled = tracker
            .list_by_state(&TransactionState::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, b.id);

        assert!(tracker.delete(&a.id).await.unwrap());
        assert!(!tracker.delete(&a.id).await.unwrap());
        assert_eq!(tracker.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_updated_before_cutoff() {
        let tracker = InMemoryTransactionTracker::new();
        tracker.create("mobility", Parameters::new()).await.unwrap();

        let removed = tracker
            .delete_updated_before(Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = tracker
            .delete_updated_before(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(tracker.count().await.unwrap(), 0);
    }
}
