use ledgerlink_core::Transaction;
use thiserror::Error;

use crate::ledger::{Ledger, LedgerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(String),
    /// The ledger already has this transaction; nothing to do.
    Duplicate,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("transaction has no resolved account")]
    Unresolved,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Send one resolved transaction. Duplicate conflicts are a successful no-op
/// so statements can be re-imported.
pub async fn submit<L: Ledger>(
    ledger: &L,
    user_id: &str,
    tx: &Transaction,
) -> Result<SubmitOutcome, SubmitError> {
    let account_id = tx.resolved_account().ok_or(SubmitError::Unresolved)?;
    match ledger.create_transaction(user_id, account_id, tx).await {
        Ok(id) => {
            tracing::debug!(tx_id = %id, account_id = %account_id, "transaction created");
            Ok(SubmitOutcome::Created(id))
        }
        Err(e) if e.is_conflict() => {
            tracing::debug!(
                date = %tx.date,
                description = %tx.description,
                "skipping duplicate transaction"
            );
            Ok(SubmitOutcome::Duplicate)
        }
        Err(e) => Err(e.into()),
    }
}
