//! HTTP/JSON client for the ledger service.
//!
//! Routes (all under `{base}/v1/users/{user_id}`):
//!   GET  ""              → {"user": {...}}
//!   GET  /accounts       → {"accounts": [...]}
//!   POST /accounts       → {"account": {...}}
//!   POST /transactions   → {"transaction": {"id": ...}}
//! 404 is not-found, 409 is already-exists.

use ledgerlink_core::{AccountId, AccountType, Direction, RemoteAccount, Transaction};
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ledger::{Ledger, LedgerError, NewAccount, User};

/// Header carrying the API credential on every call.
pub const AUTH_HEADER: &str = "x-internal-key";

#[derive(Debug, Clone)]
pub struct HttpLedger {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpLedger {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, LedgerError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|e| LedgerError::Decode {
            op: "configure client",
            message: format!("API key is not a valid header value: {e}"),
        })?;
        headers.insert(AUTH_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| LedgerError::Transport {
                op: "configure client",
                source,
            })?;

        let normalized = normalize_base_url(base_url);
        let base_url = Url::parse(&normalized).map_err(|e| LedgerError::Decode {
            op: "configure client",
            message: format!("invalid ledger URL {normalized:?}: {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(LedgerError::Decode {
                op: "configure client",
                message: format!("invalid ledger URL {normalized:?}"),
            });
        }

        Ok(Self { base_url, http })
    }

    /// `{base}/v1/users/{user_id}/{tail...}` with every segment escaped.
    fn user_url(&self, user_id: &str, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["v1", "users", user_id]).extend(tail);
        }
        url
    }

    async fn read<T: DeserializeOwned>(
        op: &'static str,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, LedgerError> {
        let resp = sent.map_err(|source| LedgerError::Transport { op, source })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::from_status(op, status.as_u16(), body));
        }
        resp.json().await.map_err(|e| LedgerError::Decode {
            op,
            message: e.to_string(),
        })
    }
}

/// Accepts `host:port` as well as full URLs; bare `:443` hosts get https.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    if trimmed.ends_with(":443") {
        format!("https://{trimmed}")
    } else {
        format!("http://{trimmed}")
    }
}

impl Ledger for HttpLedger {
    async fn get_user(&self, user_id: &str) -> Result<User, LedgerError> {
        #[derive(Deserialize)]
        struct Resp {
            user: WireUser,
        }

        let sent = self.http.get(self.user_url(user_id, &[])).send().await;
        let resp: Resp = Self::read("get user", sent).await?;
        tracing::info!(user_id, "fetched user");
        Ok(User {
            id: resp.user.id.into_string(),
            email: resp.user.email,
        })
    }

    async fn list_accounts(&self, user_id: &str) -> Result<Vec<RemoteAccount>, LedgerError> {
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            accounts: Vec<WireAccount>,
        }

        let sent = self.http.get(self.user_url(user_id, &["accounts"])).send().await;
        let resp: Resp = Self::read("list accounts", sent).await?;
        let accounts: Vec<RemoteAccount> = resp.accounts.into_iter().map(Into::into).collect();
        tracing::info!(count = accounts.len(), "fetched accounts");
        Ok(accounts)
    }

    async fn create_account(
        &self,
        user_id: &str,
        account: &NewAccount,
    ) -> Result<RemoteAccount, LedgerError> {
        #[derive(Serialize)]
        struct Req<'a> {
            name: &'a str,
            bank: &'a str,
            #[serde(rename = "type")]
            account_type: &'static str,
        }

        #[derive(Deserialize)]
        struct Resp {
            account: WireAccount,
        }

        let body = Req {
            name: &account.name,
            bank: &account.bank,
            account_type: account_type_to_wire(account.account_type),
        };
        let sent = self
            .http
            .post(self.user_url(user_id, &["accounts"]))
            .json(&body)
            .send()
            .await;
        let resp: Resp = Self::read("create account", sent).await?;
        Ok(resp.account.into())
    }

    async fn create_transaction(
        &self,
        user_id: &str,
        account_id: &AccountId,
        tx: &Transaction,
    ) -> Result<String, LedgerError> {
        #[derive(Deserialize)]
        struct Resp {
            transaction: Created,
        }

        #[derive(Deserialize)]
        struct Created {
            id: WireId,
        }

        let body = WireTransaction::new(account_id, tx);
        let sent = self
            .http
            .post(self.user_url(user_id, &["transactions"]))
            .json(&body)
            .send()
            .await;
        let resp: Resp = Self::read("create transaction", sent).await?;
        Ok(resp.transaction.id.into_string())
    }
}

/// Ids arrive as JSON numbers or strings (int64 in proto-JSON is a string).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Num(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Num(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: WireId,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAccount {
    id: WireId,
    name: String,
    #[serde(default)]
    bank: String,
    #[serde(rename = "type", default)]
    account_type: String,
}

impl From<WireAccount> for RemoteAccount {
    fn from(w: WireAccount) -> Self {
        RemoteAccount {
            id: AccountId::new(w.id.into_string()),
            name: w.name,
            account_type: account_type_from_wire(&w.account_type),
            bank: w.bank,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
struct WireMoney {
    currency_code: String,
    units: i64,
    nanos: i32,
}

#[derive(Debug, Serialize)]
struct WireTransaction<'a> {
    account_id: &'a str,
    tx_date: String,
    tx_amount: WireMoney,
    direction: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> WireTransaction<'a> {
    fn new(account_id: &'a AccountId, tx: &'a Transaction) -> Self {
        let (units, nanos) = money_parts(tx.amount);
        WireTransaction {
            account_id: account_id.as_str(),
            tx_date: tx.date.and_utc().to_rfc3339(),
            tx_amount: WireMoney {
                currency_code: tx.currency.clone(),
                units,
                nanos,
            },
            direction: match tx.direction {
                Direction::In => "DIRECTION_INCOMING",
                Direction::Out => "DIRECTION_OUTGOING",
            },
            description: Some(tx.description.as_str()).filter(|d| !d.is_empty()),
        }
    }
}

/// Split an amount into whole units and nanos, rounded to the cent first.
fn money_parts(amount: f64) -> (i64, i32) {
    let cents = (amount * 100.0).round() as i64;
    let units = cents / 100;
    let nanos = ((cents % 100) * 10_000_000) as i32;
    (units, nanos)
}

pub fn account_type_to_wire(t: AccountType) -> &'static str {
    match t {
        AccountType::Chequing => "ACCOUNT_CHEQUING",
        AccountType::Savings => "ACCOUNT_SAVINGS",
        AccountType::CreditCard => "ACCOUNT_CREDIT_CARD",
        AccountType::Unspecified => "ACCOUNT_UNSPECIFIED",
    }
}

pub fn account_type_from_wire(s: &str) -> AccountType {
    match s.trim().to_ascii_uppercase().as_str() {
        "ACCOUNT_CHEQUING" | "CHEQUING" => AccountType::Chequing,
        "ACCOUNT_SAVINGS" | "SAVINGS" => AccountType::Savings,
        "ACCOUNT_CREDIT_CARD" | "CREDIT_CARD" => AccountType::CreditCard,
        _ => AccountType::Unspecified,
    }
}
