//! Deterministic matching of statement accounts to ledger accounts.
//!
//! Tiers, first hit wins (each tier scans every candidate):
//! 1. exact name (case-insensitive) + same type
//! 2. name ends with the statement number (case-insensitive) + same type
//! 3. category keyword in the account name + same type

use serde::{Deserialize, Serialize};

use crate::account::{AccountType, RemoteAccount, StatementAccount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchTier {
    ExactName,
    NameSuffix,
    Keyword,
}

/// Keywords that identify an account category by name.
///
/// A keyword must equal a whole word of the account name, ignoring case:
/// `savings` matches "RBC Savings Plus" but not "RBC eSavings".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordRules {
    pub chequing_keywords: Vec<String>,
    pub savings_keywords: Vec<String>,
    pub credit_card_keywords: Vec<String>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            chequing_keywords: vec!["daily".to_string(), "student".to_string()],
            savings_keywords: vec!["savings".to_string()],
            credit_card_keywords: Vec::new(),
        }
    }
}

impl KeywordRules {
    fn for_type(&self, account_type: AccountType) -> &[String] {
        match account_type {
            AccountType::Chequing => &self.chequing_keywords,
            AccountType::Savings => &self.savings_keywords,
            AccountType::CreditCard => &self.credit_card_keywords,
            AccountType::Unspecified => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountMatcher {
    rules: KeywordRules,
}

impl AccountMatcher {
    pub fn new(rules: KeywordRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }

    pub fn find<'a>(
        &self,
        candidates: &'a [RemoteAccount],
        statement: &StatementAccount,
    ) -> Option<&'a RemoteAccount> {
        self.find_with_tier(candidates, statement).map(|(a, _)| a)
    }

    /// Like [`find`](Self::find) but also reports which tier matched.
    pub fn find_with_tier<'a>(
        &self,
        candidates: &'a [RemoteAccount],
        statement: &StatementAccount,
    ) -> Option<(&'a RemoteAccount, MatchTier)> {
        let wanted_type = statement.account_type;
        if wanted_type == AccountType::Unspecified {
            return None;
        }

        if let Some(hit) = Self::find_by_name(candidates, &statement.number, wanted_type) {
            return Some(hit);
        }

        let keywords = self.rules.for_type(wanted_type);
        if keywords.is_empty() {
            return None;
        }
        candidates
            .iter()
            .filter(|a| a.account_type == wanted_type)
            .find(|a| has_keyword(&a.name, keywords))
            .map(|a| (a, MatchTier::Keyword))
    }

    /// Name tiers only: exact name, then name suffix. Keywords are never
    /// consulted.
    pub fn find_by_name<'a>(
        candidates: &'a [RemoteAccount],
        name: &str,
        account_type: AccountType,
    ) -> Option<(&'a RemoteAccount, MatchTier)> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() || account_type == AccountType::Unspecified {
            return None;
        }

        let same_type = move || candidates.iter().filter(move |a| a.account_type == account_type);
        if let Some(a) = same_type().find(|a| a.name.to_lowercase() == wanted) {
            return Some((a, MatchTier::ExactName));
        }
        same_type()
            .find(|a| a.name.to_lowercase().ends_with(&wanted))
            .map(|a| (a, MatchTier::NameSuffix))
    }
}

/// True if any whole word of `name` equals one of `keywords` (case-insensitive).
fn has_keyword(name: &str, keywords: &[String]) -> bool {
    let lower = name.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| keywords.iter().any(|k| k.to_lowercase() == w))
}
