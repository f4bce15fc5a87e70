//! In-memory ledger and scripted decisions shared by the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use ledgerlink_core::{AccountId, AccountType, RemoteAccount, StatementAccount, Transaction};
use ledgerlink_sync::{Decision, DecisionSource, Ledger, LedgerError, NewAccount, User};
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::io;

pub const USER: &str = "3f1c2a9e-0000-4000-8000-000000000001";

#[derive(Default)]
pub struct FakeLedger {
    /// Accounts every list call returns
    pub accounts: RefCell<Vec<RemoteAccount>>,
    /// Accounts created by someone else; listed only once a create collides with one
    pub late_accounts: Vec<RemoteAccount>,
    pub revealed: Cell<bool>,
    /// Every create_account call conflicts
    pub force_conflict: bool,
    /// Descriptions whose submission fails with a server error
    pub failing_descriptions: Vec<String>,
    pub created_accounts: RefCell<Vec<NewAccount>>,
    pub list_calls: Cell<usize>,
    pub stored_transactions: RefCell<HashSet<String>>,
    pub next_id: Cell<u64>,
}

impl FakeLedger {
    pub fn with_accounts(accounts: Vec<RemoteAccount>) -> Self {
        Self {
            accounts: RefCell::new(accounts),
            next_id: Cell::new(100),
            ..Self::default()
        }
    }

    pub fn stored_count(&self) -> usize {
        self.stored_transactions.borrow().len()
    }

    fn visible(&self) -> Vec<RemoteAccount> {
        let mut all = self.accounts.borrow().clone();
        if self.revealed.get() {
            all.extend(self.late_accounts.iter().cloned());
        }
        all
    }
}

impl Ledger for FakeLedger {
    async fn get_user(&self, user_id: &str) -> Result<User, LedgerError> {
        if user_id != USER {
            return Err(LedgerError::NotFound { op: "get user" });
        }
        Ok(User {
            id: user_id.to_string(),
            email: None,
        })
    }

    async fn list_accounts(&self, _user_id: &str) -> Result<Vec<RemoteAccount>, LedgerError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self.visible())
    }

    async fn create_account(
        &self,
        _user_id: &str,
        account: &NewAccount,
    ) -> Result<RemoteAccount, LedgerError> {
        let same_name = |a: &RemoteAccount| a.name.eq_ignore_ascii_case(&account.name);
        if self.late_accounts.iter().any(same_name) {
            self.revealed.set(true);
            return Err(LedgerError::Conflict { op: "create account" });
        }
        let taken = self.accounts.borrow().iter().any(same_name);
        if self.force_conflict || taken {
            return Err(LedgerError::Conflict { op: "create account" });
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let created = RemoteAccount::new(
            id.to_string(),
            &account.name,
            account.account_type,
            &account.bank,
        );
        self.accounts.borrow_mut().push(created.clone());
        self.created_accounts.borrow_mut().push(account.clone());
        Ok(created)
    }

    async fn create_transaction(
        &self,
        _user_id: &str,
        account_id: &AccountId,
        tx: &Transaction,
    ) -> Result<String, LedgerError> {
        if self.failing_descriptions.contains(&tx.description) {
            return Err(LedgerError::Status {
                op: "create transaction",
                status: 500,
                body: "internal".to_string(),
            });
        }
        let key = format!("{}|{}|{:.2}|{}", account_id, tx.date, tx.amount, tx.description);
        if !self.stored_transactions.borrow_mut().insert(key.clone()) {
            return Err(LedgerError::Conflict { op: "create transaction" });
        }
        Ok(key)
    }
}

/// Answers decisions from a fixed script and records who asked.
#[derive(Default)]
pub struct ScriptedDecisions {
    answers: VecDeque<Decision>,
    pub asked: Vec<StatementAccount>,
}

impl ScriptedDecisions {
    pub fn new(answers: Vec<Decision>) -> Self {
        Self {
            answers: answers.into(),
            asked: Vec::new(),
        }
    }
}

impl DecisionSource for ScriptedDecisions {
    fn decide(
        &mut self,
        statement: &StatementAccount,
        _candidates: &[RemoteAccount],
    ) -> io::Result<Decision> {
        self.asked.push(statement.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer"))
    }
}

pub fn account(id: &str, name: &str, t: AccountType) -> RemoteAccount {
    RemoteAccount::new(id, name, t, "RBC")
}

pub fn tx(number: &str, t: AccountType, day: u32, amount: f64, description: &str) -> Transaction {
    let date = NaiveDate::from_ymd_opt(2025, 1, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    Transaction::from_signed(date, amount, "CAD", description, StatementAccount::new(number, t))
}
