use std::sync::Arc;

use orchestrator_core::{OrchestratorError, OrchestratorResult};
use orchestrator_domain::{
    operation, ExecutionOutcome, Intent, TransactionRecord, TransactionState, TransactionStore,
    TransactionUpdate,
};
use tracing::{error, info, instrument, warn};

use crate::factory::StrategyFactory;

/// 调度管道：意图 -> 策略执行 -> 交易记录
///
/// 策略执行期间不持有任何锁；记录只在执行完成后通过存储的单次原子操作读写。
pub struct DispatchPipeline {
    factory: Arc<StrategyFactory>,
    store: Arc<dyn TransactionStore>,
}

impl DispatchPipeline {
    pub fn new(factory: Arc<StrategyFactory>, store: Arc<dyn TransactionStore>) -> Self {
        Self { factory, store }
    }

    pub fn store(&self) -> &Arc<dyn TransactionStore> {
        &self.store
    }

    pub fn factory(&self) -> &Arc<StrategyFactory> {
        &self.factory
    }

    #[instrument(skip_all, fields(domain = %intent.domain, operation = %intent.operation))]
    pub async fn handle(&self, intent: &Intent) -> OrchestratorResult<ExecutionOutcome> {
        intent.validate()?;

        let strategy = self.factory.create_selected().await?;

        match strategy.execute(intent).await {
            Ok(outcome) => {
                if let Err(e) = self.record_outcome(intent, &outcome).await {
                    error!(strategy = strategy.name(), error = %e, "Failed to record outcome");
                    self.mark_failed(intent).await;
                    return Err(e);
                }
                info!(
                    strategy = strategy.name(),
                    transaction_id = %outcome.transaction_id,
                    state = %outcome.state,
                    "Intent dispatched"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(strategy = strategy.name(), error = %e, "Strategy execution failed");
                self.mark_failed(intent).await;
                Err(e)
            }
        }
    }

    /// 取消一个已存在的交易
    pub async fn cancel(&self, transaction_id: &str) -> OrchestratorResult<TransactionRecord> {
        let record = self
            .store
            .update(
                transaction_id,
                TransactionUpdate::new()
                    .state(TransactionState::Cancelled)
                    .operation(operation::CANCEL),
            )
            .await?;

        info!(transaction_id = %transaction_id, "Transaction cancelled");
        Ok(record)
    }

    async fn record_outcome(&self, intent: &Intent, outcome: &ExecutionOutcome) -> OrchestratorResult<()> {
        if outcome.transaction_id.is_empty() {
            return Err(OrchestratorError::gateway("策略结果缺少交易ID"));
        }

        let state = TransactionState::from(outcome.state.as_str());
        let opened = TransactionRecord::opened(
            outcome.transaction_id.clone(),
            intent.domain.clone(),
            intent.context.clone(),
            intent.operation.clone(),
            state.clone(),
            outcome.results.clone(),
        );

        let (_, inserted) = self.store.get_or_insert(opened).await?;
        if inserted {
            return Ok(());
        }

        let mut update = TransactionUpdate::new()
            .state(state)
            .results(outcome.results.clone())
            .operation(intent.operation.clone());
        if !intent.context.is_empty() {
            update = update.context(intent.context.clone());
        }

        self.store.update(&outcome.transaction_id, update).await?;
        Ok(())
    }

    /// 有关联交易时把它标记为 FAILED。标记失败只记录日志，不覆盖原始错误
    async fn mark_failed(&self, intent: &Intent) {
        let Some(transaction_id) = intent.transaction_id() else {
            return;
        };

        let update = TransactionUpdate::new()
            .state(TransactionState::Failed)
            .operation(intent.operation.clone());

        match self.store.update(transaction_id, update).await {
            Ok(_) => warn!(transaction_id = %transaction_id, "Transaction marked as failed"),
            Err(OrchestratorError::TransactionNotFound { .. }) => {}
            Err(e) => error!(
                transaction_id = %transaction_id,
                error = %e,
                "Failed to mark transaction as failed"
            ),
        }
    }
}
