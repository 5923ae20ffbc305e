//! Remote ledger access
//!
//! [`LedgerClient`] is the seam between the reconciliation session and the
//! budgeting API, so sessions can be driven by a fake in tests.

pub mod ynab;

pub use ynab::YnabClient;

use crate::error::ReconcileResult;
use crate::models::{AccountSummary, BudgetSummary, RemoteTransaction};

/// Read-only view of a remote budgeting ledger
pub trait LedgerClient {
    /// Budgets visible to the credential
    fn list_budgets(&self) -> ReconcileResult<Vec<BudgetSummary>>;

    /// Accounts of a budget
    fn list_accounts(&self, budget_id: &str) -> ReconcileResult<Vec<AccountSummary>>;

    /// Transactions of one account, in API order
    fn list_transactions(
        &self,
        budget_id: &str,
        account_id: &str,
    ) -> ReconcileResult<Vec<RemoteTransaction>>;
}

impl<T: LedgerClient + ?Sized> LedgerClient for &T {
    fn list_budgets(&self) -> ReconcileResult<Vec<BudgetSummary>> {
        (**self).list_budgets()
    }

    fn list_accounts(&self, budget_id: &str) -> ReconcileResult<Vec<AccountSummary>> {
        (**self).list_accounts(budget_id)
    }

    fn list_transactions(
        &self,
        budget_id: &str,
        account_id: &str,
    ) -> ReconcileResult<Vec<RemoteTransaction>> {
        (**self).list_transactions(budget_id, account_id)
    }
}
