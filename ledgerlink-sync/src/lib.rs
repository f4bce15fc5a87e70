//! ledgerlink-sync: mapping store, ledger client, account reconciliation and
//! transaction submission

pub mod client;
pub mod ledger;
pub mod reconcile;
pub mod run;
pub mod store;
pub mod submit;

pub use client::HttpLedger;
pub use ledger::{Ledger, LedgerError, NewAccount, User};
pub use reconcile::{Decision, DecisionSource, Reconciler, Resolution, ResolvedVia, SyncError};
pub use run::{RunReport, SyncRun};
pub use store::{MappingStore, StoreError};
pub use submit::{SubmitError, SubmitOutcome, submit};
