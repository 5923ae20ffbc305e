//! YNAB REST client
//!
//! Blocking, one request per call, no retry. Every response is wrapped as
//! `{"data": {...}}`; the token goes out as a bearer header.

use std::time::Duration;

use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use super::LedgerClient;
use crate::config::settings::DEFAULT_API_BASE_URL;
use crate::error::{ReconcileError, ReconcileResult};
use crate::models::remote::{AccountsData, BudgetsData, Envelope, TransactionsData};
use crate::models::{AccountSummary, BudgetSummary, RemoteTransaction};

const USER_AGENT: &str = concat!("ynab-reconciler/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the YNAB v1 API
pub struct YnabClient {
    http: reqwest::blocking::Client,
    token: Zeroizing<String>,
    base_url: String,
}

impl std::fmt::Debug for YnabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YnabClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl YnabClient {
    /// Client against the public API
    pub fn new(token: Zeroizing<String>) -> ReconcileResult<Self> {
        Self::with_base_url(token, DEFAULT_API_BASE_URL)
    }

    /// Client against a custom endpoint (mock servers, proxies)
    pub fn with_base_url(token: Zeroizing<String>, base_url: &str) -> ReconcileResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ReconcileError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> ReconcileResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Requesting {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.token.as_str())
            .send()
            .map_err(|e| ReconcileError::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
            return Err(ReconcileError::Auth(format!(
                "YNAB rejected the token ({}): {}",
                status.as_u16(),
                error_detail(&body)
            )));
        }
        if !status.is_success() {
            let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
            return Err(ReconcileError::Network(format!(
                "YNAB returned {} for {}: {}",
                status.as_u16(),
                path,
                error_detail(&body)
            )));
        }

        let envelope: Envelope<T> = resp.json().map_err(|e| {
            ReconcileError::Network(format!("Unexpected response body from {}: {}", path, e))
        })?;
        Ok(envelope.data)
    }
}

impl LedgerClient for YnabClient {
    fn list_budgets(&self) -> ReconcileResult<Vec<BudgetSummary>> {
        let data: BudgetsData = self.get("/budgets")?;
        Ok(data.budgets)
    }

    fn list_accounts(&self, budget_id: &str) -> ReconcileResult<Vec<AccountSummary>> {
        let data: AccountsData = self.get(&format!("/budgets/{}/accounts", budget_id))?;
        Ok(data.accounts)
    }

    fn list_transactions(
        &self,
        budget_id: &str,
        account_id: &str,
    ) -> ReconcileResult<Vec<RemoteTransaction>> {
        let data: TransactionsData = self.get(&format!(
            "/budgets/{}/accounts/{}/transactions",
            budget_id, account_id
        ))?;
        tracing::debug!("Fetched {} transactions", data.transactions.len());
        Ok(data.transactions)
    }
}

/// Pull the human-readable part out of a YNAB error body
fn error_detail(body: &serde_json::Value) -> String {
    body.get("error")
        .and_then(|e| e.get("detail").or_else(|| e.get("name")))
        .and_then(|v| v.as_str())
        .unwrap_or("no error detail")
        .to_string()
}
