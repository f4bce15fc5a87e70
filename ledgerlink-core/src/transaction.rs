//! Statement transactions on their way to the ledger.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, StatementAccount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "in")]
    In,
    #[serde(rename = "out")]
    Out,
}

/// A transaction extracted from a statement.
///
/// `account_id` starts unset and is assigned once during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub account_id: Option<AccountId>,
    pub date: NaiveDateTime,
    /// Unsigned magnitude; sign lives in `direction`
    pub amount: f64,
    pub direction: Direction,
    pub currency: String,
    pub description: String,
    pub source: StatementAccount,
    pub source_file: Option<String>,
}

impl Transaction {
    /// Build from a signed statement amount: negative is money out.
    pub fn from_signed(
        date: NaiveDateTime,
        signed_amount: f64,
        currency: &str,
        description: &str,
        source: StatementAccount,
    ) -> Self {
        let (amount, direction) = if signed_amount < 0.0 {
            (-signed_amount, Direction::Out)
        } else {
            (signed_amount, Direction::In)
        };
        Transaction {
            account_id: None,
            date,
            amount,
            direction,
            currency: currency.to_string(),
            description: description.to_string(),
            source,
            source_file: None,
        }
    }

    /// The resolved account, if one has been assigned and is non-empty.
    pub fn resolved_account(&self) -> Option<&AccountId> {
        self.account_id.as_ref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use chrono::NaiveDate;

    fn at_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_signed_amount_sets_direction() {
        let src = StatementAccount::new("05172-5163878", AccountType::Chequing);
        let out = Transaction::from_signed(at_noon(), -42.5, "CAD", "COFFEE", src.clone());
        assert_eq!(out.amount, 42.5);
        assert_eq!(out.direction, Direction::Out);

        let inc = Transaction::from_signed(at_noon(), 1200.0, "CAD", "PAYROLL", src);
        assert_eq!(inc.amount, 1200.0);
        assert_eq!(inc.direction, Direction::In);
        assert!(inc.account_id.is_none());
    }

    #[test]
    fn test_empty_account_id_is_not_resolved() {
        let src = StatementAccount::new("1234", AccountType::CreditCard);
        let mut tx = Transaction::from_signed(at_noon(), -5.0, "CAD", "X", src);
        assert!(tx.resolved_account().is_none());
        tx.account_id = Some(AccountId::new(""));
        assert!(tx.resolved_account().is_none());
        tx.account_id = Some(AccountId::new("7"));
        assert_eq!(tx.resolved_account().map(|id| id.as_str()), Some("7"));
    }
}
