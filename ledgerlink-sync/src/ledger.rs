//! The ledger service as seen by the sync engine.

use ledgerlink_core::{AccountId, AccountType, RemoteAccount, Transaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{op}: not found")]
    NotFound { op: &'static str },
    /// A uniqueness constraint was hit on the ledger side.
    #[error("{op}: already exists")]
    Conflict { op: &'static str },
    #[error("{op}: ledger returned {status}: {body}")]
    Status {
        op: &'static str,
        status: u16,
        body: String,
    },
    #[error("{op}: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{op}: invalid response: {message}")]
    Decode { op: &'static str, message: String },
}

impl LedgerError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(op: &'static str, status: u16, body: String) -> Self {
        match status {
            404 => LedgerError::NotFound { op },
            409 => LedgerError::Conflict { op },
            _ => LedgerError::Status { op, status, body },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request to create an account on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub bank: String,
}

/// Operations the sync engine needs from the ledger. Every call carries the
/// user id; credentials are the implementation's concern.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    async fn get_user(&self, user_id: &str) -> Result<User, LedgerError>;

    async fn list_accounts(&self, user_id: &str) -> Result<Vec<RemoteAccount>, LedgerError>;

    async fn create_account(
        &self,
        user_id: &str,
        account: &NewAccount,
    ) -> Result<RemoteAccount, LedgerError>;

    /// Returns the ledger's transaction id.
    async fn create_transaction(
        &self,
        user_id: &str,
        account_id: &AccountId,
        tx: &Transaction,
    ) -> Result<String, LedgerError>;
}
