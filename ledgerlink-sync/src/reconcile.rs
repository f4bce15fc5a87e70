//! Resolve statement accounts to ledger accounts.
//!
//! Per statement account, in order, first success wins:
//! 1. an account already decided for it earlier in this run
//! 2. saved mapping (if its account still exists on the ledger)
//! 3. heuristic match via [`AccountMatcher`]
//! 4. a decision from a [`DecisionSource`], asked at most once per run
//!
//! Resolution is sequential; the candidate list and the per-run decision
//! memo are owned here and never shared.

use ledgerlink_core::{
    AccountId, AccountMapping, AccountMatcher, MatchTier, RemoteAccount, StatementAccount,
};
use std::collections::HashMap;
use std::io;
use thiserror::Error;

use crate::ledger::{Ledger, LedgerError, NewAccount};
use crate::store::{MappingStore, StoreError};

/// Outcome of asking for an explicit account choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    UseExisting(AccountId),
    CreateNew(NewAccount),
}

/// Something that can choose an account when heuristics fail: a terminal
/// prompt, a scripted answer list, etc.
pub trait DecisionSource {
    fn decide(
        &mut self,
        statement: &StatementAccount,
        candidates: &[RemoteAccount],
    ) -> io::Result<Decision>;
}

impl<D: DecisionSource + ?Sized> DecisionSource for &mut D {
    fn decide(
        &mut self,
        statement: &StatementAccount,
        candidates: &[RemoteAccount],
    ) -> io::Result<Decision> {
        (**self).decide(statement, candidates)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("no account decision for {statement}: {source}")]
    Decision {
        statement: StatementAccount,
        #[source]
        source: io::Error,
    },
    #[error("selected account {id} is not in the ledger's account list")]
    SelectedAccountMissing { id: AccountId },
    #[error("creating {name:?} for {statement} conflicted and no matching account was found after refresh")]
    UnresolvedAfterConflict {
        statement: StatementAccount,
        name: String,
    },
}

/// Which tier produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedVia {
    SavedMapping,
    Heuristic(MatchTier),
    Decision,
    /// Reused a decision made earlier in this run
    Memoized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub account_id: AccountId,
    pub via: ResolvedVia,
}

pub struct Reconciler<'l, L, D> {
    ledger: &'l L,
    user_id: String,
    matcher: AccountMatcher,
    store: MappingStore,
    decisions: D,
    candidates: Vec<RemoteAccount>,
    decided: HashMap<StatementAccount, AccountId>,
    stale_mappings: usize,
}

impl<'l, L: Ledger, D: DecisionSource> Reconciler<'l, L, D> {
    pub fn new(
        ledger: &'l L,
        user_id: &str,
        matcher: AccountMatcher,
        store: MappingStore,
        decisions: D,
        candidates: Vec<RemoteAccount>,
    ) -> Self {
        Self {
            ledger,
            user_id: user_id.to_string(),
            matcher,
            store,
            decisions,
            candidates,
            decided: HashMap::new(),
            stale_mappings: 0,
        }
    }

    pub fn candidates(&self) -> &[RemoteAccount] {
        &self.candidates
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Saved mappings that pointed at accounts missing from the ledger.
    pub fn stale_mappings(&self) -> usize {
        self.stale_mappings
    }

    pub fn into_store(self) -> MappingStore {
        self.store
    }

    pub async fn resolve(&mut self, statement: &StatementAccount) -> Result<Resolution, SyncError> {
        if let Some(account_id) = self.decided.get(statement) {
            return Ok(Resolution {
                account_id: account_id.clone(),
                via: ResolvedVia::Memoized,
            });
        }

        if let Some(account_id) = self.from_saved_mapping(statement) {
            return Ok(Resolution {
                account_id,
                via: ResolvedVia::SavedMapping,
            });
        }

        if let Some((account, tier)) = self.matcher.find_with_tier(&self.candidates, statement) {
            let account = account.clone();
            self.remember(statement, &account);
            return Ok(Resolution {
                account_id: account.id,
                via: ResolvedVia::Heuristic(tier),
            });
        }

        let account = self.ask(statement).await?;
        self.decided.insert(statement.clone(), account.id.clone());
        self.remember(statement, &account);
        Ok(Resolution {
            account_id: account.id,
            via: ResolvedVia::Decision,
        })
    }

    fn from_saved_mapping(&mut self, statement: &StatementAccount) -> Option<AccountId> {
        let mapping = self.store.find_for(statement)?;
        if self.candidates.iter().any(|a| a.id == mapping.remote_account_id) {
            return Some(mapping.remote_account_id.clone());
        }
        tracing::warn!(
            statement = %statement,
            account_id = %mapping.remote_account_id,
            account_name = %mapping.remote_account_name,
            "saved mapping points to an account that no longer exists; trying other matches"
        );
        self.stale_mappings += 1;
        None
    }

    /// Persist `statement → account` unless the store already says so.
    /// A failed write is only logged.
    fn remember(&mut self, statement: &StatementAccount, account: &RemoteAccount) {
        if self
            .store
            .find_for(statement)
            .is_some_and(|m| m.remote_account_id == account.id)
        {
            return;
        }
        if let Err(e) = self.store.upsert(AccountMapping::new(statement, account)) {
            tracing::warn!(statement = %statement, error = %e, "failed to save account mapping");
        }
    }

    async fn ask(&mut self, statement: &StatementAccount) -> Result<RemoteAccount, SyncError> {
        let decision = self
            .decisions
            .decide(statement, &self.candidates)
            .map_err(|source| SyncError::Decision {
                statement: statement.clone(),
                source,
            })?;

        match decision {
            Decision::UseExisting(id) => {
                let account = self
                    .candidates
                    .iter()
                    .find(|a| a.id == id)
                    .cloned()
                    .ok_or(SyncError::SelectedAccountMissing { id })?;
                if account.account_type != statement.account_type {
                    tracing::warn!(
                        statement = %statement,
                        account = %account.name,
                        account_type = %account.account_type,
                        "account type mismatch (continuing anyway)"
                    );
                }
                Ok(account)
            }
            Decision::CreateNew(new) => self.create(statement, new).await,
        }
    }

    async fn create(
        &mut self,
        statement: &StatementAccount,
        new: NewAccount,
    ) -> Result<RemoteAccount, SyncError> {
        match self.ledger.create_account(&self.user_id, &new).await {
            Ok(account) => {
                tracing::info!(id = %account.id, name = %account.name, "created account");
                self.candidates.push(account.clone());
                Ok(account)
            }
            Err(e) if e.is_conflict() => {
                tracing::info!(name = %new.name, "account already exists on the ledger; refreshing");
                let fresh = self.ledger.list_accounts(&self.user_id).await?;
                self.merge_candidates(fresh);

                AccountMatcher::find_by_name(&self.candidates, &new.name, new.account_type)
                    .map(|(a, _)| a)
                    .or_else(|| self.matcher.find(&self.candidates, statement))
                    .cloned()
                    .ok_or_else(|| SyncError::UnresolvedAfterConflict {
                        statement: statement.clone(),
                        name: new.name,
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append accounts not already known, keeping existing order.
    fn merge_candidates(&mut self, fresh: Vec<RemoteAccount>) {
        for account in fresh {
            if !self.candidates.iter().any(|a| a.id == account.id) {
                self.candidates.push(account);
            }
        }
    }
}
