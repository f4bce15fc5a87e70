use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AccountType, RemoteAccount, StatementAccount};

/// A confirmed association between a statement account and a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMapping {
    pub statement_account_number: String,
    pub statement_account_type: AccountType,
    pub remote_account_id: AccountId,
    pub remote_account_name: String,
}

impl AccountMapping {
    pub fn new(statement: &StatementAccount, account: &RemoteAccount) -> Self {
        AccountMapping {
            statement_account_number: statement.number.clone(),
            statement_account_type: statement.account_type,
            remote_account_id: account.id.clone(),
            remote_account_name: account.name.clone(),
        }
    }

    /// True if this mapping is keyed by the given (number, type) pair.
    pub fn has_key(&self, number: &str, account_type: AccountType) -> bool {
        self.statement_account_number == number && self.statement_account_type == account_type
    }
}
