//! Records returned by the YNAB API
//!
//! These mirror the JSON payloads closely; conversion into the normalized
//! [`Transaction`](super::Transaction) happens in the normalizer.

use serde::{Deserialize, Serialize};

/// A budget as listed by `GET /budgets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub id: String,
    pub name: String,
}

/// An account as listed by `GET /budgets/{id}/accounts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub deleted: bool,
}

impl AccountSummary {
    /// Whether the account should be offered for reconciliation
    pub fn is_open(&self) -> bool {
        !self.closed && !self.deleted
    }
}

/// A raw account transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTransaction {
    pub id: String,
    /// ISO-8601 date (`YYYY-MM-DD`)
    pub date: String,
    /// Amount in milliunits
    pub amount: i64,
    #[serde(default)]
    pub payee_name: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub import_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// Response envelope: `{"data": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BudgetsData {
    pub budgets: Vec<BudgetSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountsData {
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionsData {
    pub transactions: Vec<RemoteTransaction>,
}
