//! The submission seam shared by the executor, the queue and batch sessions.

use std::sync::Arc;

use async_trait::async_trait;
use courier_primitives::{Account, CallDescriptor, TransactionKind};
use courier_txmgr::{LedgerClient, TxError, TxExecutor, TxOutcome};

/// Something that can submit a list of calls as one transaction.
#[async_trait]
pub trait Dispatch: Send + Sync + 'static {
    /// Submits `calls` under `account` and reports the outcome.
    async fn dispatch(
        &self,
        account: &Account,
        calls: Vec<CallDescriptor>,
    ) -> Result<TxOutcome, TxError>;

    /// Returns the kind that classifies `calls`.
    fn transaction_kind(&self, calls: &[CallDescriptor]) -> Option<TransactionKind> {
        calls.first().and_then(CallDescriptor::kind)
    }
}

#[async_trait]
impl<L: LedgerClient + 'static> Dispatch for TxExecutor<L> {
    async fn dispatch(
        &self,
        account: &Account,
        calls: Vec<CallDescriptor>,
    ) -> Result<TxOutcome, TxError> {
        self.execute_and_check(account, calls).await
    }

    fn transaction_kind(&self, calls: &[CallDescriptor]) -> Option<TransactionKind> {
        Self::transaction_kind(self, calls)
    }
}

#[async_trait]
impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    async fn dispatch(
        &self,
        account: &Account,
        calls: Vec<CallDescriptor>,
    ) -> Result<TxOutcome, TxError> {
        (**self).dispatch(account, calls).await
    }

    fn transaction_kind(&self, calls: &[CallDescriptor]) -> Option<TransactionKind> {
        (**self).transaction_kind(calls)
    }
}

#[cfg(test)]
mod tests {
    use courier_local::InMemoryLedger;
    use courier_primitives::felt_from_u64;
    use courier_txmgr::TxManagerConfig;

    use super::*;

    #[test]
    fn default_kind_comes_from_first_call() {
        struct Never;

        #[async_trait]
        impl Dispatch for Never {
            async fn dispatch(
                &self,
                _account: &Account,
                _calls: Vec<CallDescriptor>,
            ) -> Result<TxOutcome, TxError> {
                Err(TxError::QueueClosed)
            }
        }

        let calls = vec![
            CallDescriptor::new(felt_from_u64(1), "set_address_name"),
            CallDescriptor::new(felt_from_u64(1), "explorer_move"),
        ];
        assert_eq!(Never.transaction_kind(&calls), Some(TransactionKind::SetAddressName));
        assert_eq!(Never.transaction_kind(&[]), None);
    }

    #[tokio::test]
    async fn executor_dispatch_submits_through_the_ledger() {
        let ledger = Arc::new(InMemoryLedger::new());
        let executor = Arc::new(TxExecutor::new(Arc::clone(&ledger), TxManagerConfig::default()));
        let account = Account::new(felt_from_u64(0xacc));

        let outcome = executor
            .dispatch(&account, vec![CallDescriptor::new(felt_from_u64(2), "send")])
            .await
            .unwrap();

        assert_eq!(outcome.tx_hash(), Some(felt_from_u64(1)));
        assert_eq!(ledger.submission_count(), 1);
    }

    #[test]
    fn executor_kind_skips_randomness_provider() {
        let provider = felt_from_u64(0xf00);
        let config = TxManagerConfig::builder().randomness_provider(Some(provider)).build();
        let executor = TxExecutor::new(Arc::new(InMemoryLedger::new()), config);
        let calls = vec![
            CallDescriptor::new(provider, "request_random"),
            CallDescriptor::new(felt_from_u64(3), "explorer_move"),
        ];

        assert_eq!(Dispatch::transaction_kind(&executor, &calls), Some(TransactionKind::ExplorerMove));
    }
}
