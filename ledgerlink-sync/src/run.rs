//! One import run: fetch the user's accounts, reconcile every transaction,
//! submit it, and tally the results.

use ledgerlink_core::{AccountMatcher, Transaction};
use std::collections::BTreeMap;

use crate::ledger::Ledger;
use crate::reconcile::{DecisionSource, Reconciler, ResolvedVia, SyncError};
use crate::store::MappingStore;
use crate::submit::{SubmitOutcome, submit};

/// Progress callback fires every this many transactions.
pub const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// Transactions per statement account number
    pub per_account: BTreeMap<String, usize>,
    pub via_saved_mapping: usize,
    pub via_heuristic: usize,
    pub via_decision: usize,
    /// Reused a decision made earlier in the same run
    pub via_memo: usize,
    pub stale_mappings: usize,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.created + self.duplicates + self.failed
    }

    fn count_resolution(&mut self, via: ResolvedVia) {
        match via {
            ResolvedVia::SavedMapping => self.via_saved_mapping += 1,
            ResolvedVia::Heuristic(_) => self.via_heuristic += 1,
            ResolvedVia::Decision => self.via_decision += 1,
            ResolvedVia::Memoized => self.via_memo += 1,
        }
    }
}

pub struct SyncRun<'l, L> {
    pub ledger: &'l L,
    pub user_id: String,
    pub matcher: AccountMatcher,
}

impl<'l, L: Ledger> SyncRun<'l, L> {
    pub fn new(ledger: &'l L, user_id: &str, matcher: AccountMatcher) -> Self {
        Self {
            ledger,
            user_id: user_id.to_string(),
            matcher,
        }
    }

    /// Reconcile and submit `transactions` in order.
    ///
    /// Returns `Err` only for run-aborting failures (user/accounts lookup,
    /// an account that cannot be resolved). Per-transaction submit failures
    /// are counted in the report.
    pub async fn execute<D: DecisionSource>(
        &self,
        store: MappingStore,
        decisions: D,
        transactions: Vec<Transaction>,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<RunReport, SyncError> {
        self.ledger.get_user(&self.user_id).await?;
        let accounts = self.ledger.list_accounts(&self.user_id).await?;

        let mut reconciler = Reconciler::new(
            self.ledger,
            &self.user_id,
            self.matcher.clone(),
            store,
            decisions,
            accounts,
        );

        let total = transactions.len();
        let mut report = RunReport::default();

        for (i, mut tx) in transactions.into_iter().enumerate() {
            let resolution = reconciler.resolve(&tx.source).await?;
            report.count_resolution(resolution.via);
            tx.account_id = Some(resolution.account_id);
            *report.per_account.entry(tx.source.number.clone()).or_insert(0) += 1;

            match submit(self.ledger, &self.user_id, &tx).await {
                Ok(SubmitOutcome::Created(_)) => report.created += 1,
                Ok(SubmitOutcome::Duplicate) => report.duplicates += 1,
                Err(e) => {
                    tracing::error!(
                        date = %tx.date,
                        description = %tx.description,
                        error = %e,
                        "failed to submit transaction"
                    );
                    report.failed += 1;
                }
            }

            if (i + 1) % PROGRESS_EVERY == 0 {
                on_progress(i + 1, total);
            }
        }

        report.stale_mappings = reconciler.stale_mappings();
        Ok(report)
    }
}
