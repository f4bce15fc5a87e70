use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use ledgerlink_core::{StatementAccount, Transaction};
use serde::{Deserialize, Serialize};

/// Timestamp format emitted by the statement parser.
pub const PARSER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One row of parser output, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: String,
    /// Signed: negative means money out
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub posting_date: Option<String>,
    #[serde(default)]
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub file: String,
    pub transaction_count: usize,
    pub processed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    pub total_files: usize,
    pub processed_files: usize,
    pub total_transactions: usize,
}

/// Everything the parser reports for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutput {
    #[serde(default)]
    pub transactions: Vec<ParsedTransaction>,
    #[serde(default)]
    pub file_results: Vec<FileResult>,
    #[serde(default)]
    pub summary: ParseSummary,
}

impl ParsedTransaction {
    pub fn statement_account(&self) -> StatementAccount {
        StatementAccount::from_parsed(self.account_number.as_deref(), &self.account_type)
    }

    pub fn into_transaction(self, currency: &str) -> Result<Transaction> {
        let date = NaiveDateTime::parse_from_str(self.date.trim(), PARSER_DATE_FORMAT)
            .with_context(|| format!("parse date {:?}", self.date))?;
        let source = self.statement_account();
        let mut tx = Transaction::from_signed(date, self.amount, currency, &self.description, source);
        tx.source_file = self.source_file;
        Ok(tx)
    }
}

impl ParseOutput {
    /// Normalize every row into a [`Transaction`]. A single bad date fails the
    /// whole batch, since the parser output is then not trustworthy.
    pub fn to_transactions(&self, currency: &str) -> Result<Vec<Transaction>> {
        self.transactions
            .iter()
            .cloned()
            .map(|t| t.into_transaction(currency))
            .collect()
    }

    pub fn processed_files(&self) -> impl Iterator<Item = &FileResult> {
        self.file_results.iter().filter(|f| f.processed)
    }
}
