//! Account types shared by the statement side and the ledger side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account number used when the parser could not extract one.
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

/// Account categories understood by both statements and the ledger.
///
/// Serialized with the statement parser's vocabulary (`"visa"` for credit
/// cards) so mapping files stay readable by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "chequing")]
    Chequing,
    #[serde(rename = "savings")]
    Savings,
    #[serde(rename = "visa", alias = "credit_card")]
    CreditCard,
    #[serde(rename = "unspecified")]
    Unspecified,
}

impl AccountType {
    /// Map the parser's account type string (`chequing`, `savings`, `visa`).
    pub fn from_statement(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "chequing" => AccountType::Chequing,
            "savings" => AccountType::Savings,
            "visa" => AccountType::CreditCard,
            _ => AccountType::Unspecified,
        }
    }

    pub fn as_statement_str(&self) -> &'static str {
        match self {
            AccountType::Chequing => "chequing",
            AccountType::Savings => "savings",
            AccountType::CreditCard => "visa",
            AccountType::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Chequing => write!(f, "chequing"),
            AccountType::Savings => write!(f, "savings"),
            AccountType::CreditCard => write!(f, "credit card"),
            AccountType::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Opaque identifier assigned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_string())
    }
}

/// An account record held by the ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAccount {
    pub id: AccountId,
    pub name: String,
    pub account_type: AccountType,
    /// Institution tag, e.g. "RBC"
    pub bank: String,
}

impl RemoteAccount {
    pub fn new(id: impl Into<String>, name: &str, account_type: AccountType, bank: &str) -> Self {
        RemoteAccount {
            id: AccountId::new(id),
            name: name.to_string(),
            account_type,
            bank: bank.to_string(),
        }
    }
}

/// The (account number or name, account type) pair extracted from a
/// statement. This is the reconciliation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementAccount {
    pub number: String,
    pub account_type: AccountType,
}

impl StatementAccount {
    /// Build a descriptor from raw parser fields. Missing or blank numbers
    /// collapse to [`UNKNOWN_ACCOUNT`].
    pub fn from_parsed(number: Option<&str>, account_type: &str) -> Self {
        let number = match number.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => UNKNOWN_ACCOUNT.to_string(),
        };
        StatementAccount {
            number,
            account_type: AccountType::from_statement(account_type),
        }
    }

    pub fn new(number: &str, account_type: AccountType) -> Self {
        StatementAccount {
            number: number.to_string(),
            account_type,
        }
    }
}

impl fmt::Display for StatementAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number, self.account_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_type_strings() {
        assert_eq!(AccountType::from_statement("chequing"), AccountType::Chequing);
        assert_eq!(AccountType::from_statement(" Savings "), AccountType::Savings);
        assert_eq!(AccountType::from_statement("visa"), AccountType::CreditCard);
        assert_eq!(AccountType::from_statement("mortgage"), AccountType::Unspecified);
        assert_eq!(AccountType::from_statement(""), AccountType::Unspecified);
    }

    #[test]
    fn test_blank_number_becomes_unknown() {
        let d = StatementAccount::from_parsed(None, "visa");
        assert_eq!(d.number, UNKNOWN_ACCOUNT);
        assert_eq!(d.account_type, AccountType::CreditCard);

        let d = StatementAccount::from_parsed(Some("  "), "chequing");
        assert_eq!(d.number, UNKNOWN_ACCOUNT);

        let d = StatementAccount::from_parsed(Some("05172-5163878"), "savings");
        assert_eq!(d.number, "05172-5163878");
    }

    #[test]
    fn test_account_type_serde_uses_statement_vocabulary() {
        let s = serde_json::to_string(&AccountType::CreditCard).unwrap();
        assert_eq!(s, "\"visa\"");
        let t: AccountType = serde_json::from_str("\"credit_card\"").unwrap();
        assert_eq!(t, AccountType::CreditCard);
    }
}
