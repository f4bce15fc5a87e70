//! ledgerlink-core: statement/ledger account types and the account matcher

pub mod account;
pub mod mapping;
pub mod matcher;
pub mod transaction;

pub use account::{AccountId, AccountType, RemoteAccount, StatementAccount};
pub use mapping::AccountMapping;
pub use matcher::{AccountMatcher, KeywordRules, MatchTier};
pub use transaction::{Direction, Transaction};
