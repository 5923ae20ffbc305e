//! Reconciliation session
//!
//! A session bundles everything one run needs (settings, the remote client
//! and the cache location) and drives load, normalize, index and match.
//! Both sources are fully loaded before anything is matched, so a failure on
//! either side aborts the run without a partial report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::matcher::{MatchSummary, ReconciliationMatcher};
use super::normalize::{NormalizedBatch, Normalizer, SkippedRecord};
use crate::client::LedgerClient;
use crate::config::ReconcileConfig;
use crate::error::ReconcileResult;
use crate::import::CsvImporter;
use crate::models::{MatchResult, RemoteTransaction};
use crate::storage::{TransactionCache, DEFAULT_CACHE_FILE};

/// Where the remote transactions of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOrigin {
    Api,
    Cache,
}

/// Remote transactions as loaded for a run
#[derive(Debug, Clone)]
pub struct RemoteSnapshot {
    pub origin: RemoteOrigin,
    pub fetched_at: DateTime<Utc>,
    pub transactions: Vec<RemoteTransaction>,
}

/// Everything a finished run reports
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub budget_id: String,
    pub account_id: String,
    pub csv_path: String,
    pub remote_origin: RemoteOrigin,
    pub remote_fetched_at: DateTime<Utc>,
    pub date_window_days: u32,
    pub decimal_places: u32,
    pub summary: MatchSummary,
    pub results: Vec<MatchResult>,
    pub skipped: Vec<SkippedRecord>,
}

/// Context for one reconciliation run
pub struct Session<'a> {
    config: ReconcileConfig,
    client: &'a dyn LedgerClient,
    cache_path: PathBuf,
    refresh: bool,
}

impl<'a> Session<'a> {
    /// Create a session using the default cache file
    pub fn new(config: ReconcileConfig, client: &'a dyn LedgerClient) -> Self {
        Self {
            config,
            client,
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            refresh: false,
        }
    }

    /// Use a different cache file
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    /// Ignore cached transactions and refetch
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Remote transactions for an account, from the cache when usable
    pub fn load_remote(&self, budget_id: &str, account_id: &str) -> ReconcileResult<RemoteSnapshot> {
        let now = Utc::now();

        let mut cache = match TransactionCache::load(&self.cache_path) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("Ignoring unreadable transaction cache: {}", e);
                TransactionCache::empty(&self.cache_path)
            }
        };

        if !self.refresh {
            if let Some(entry) =
                cache.get_fresh(budget_id, account_id, self.config.cache_ttl_hours, now)
            {
                tracing::debug!(
                    "Using {} cached transactions from {}",
                    entry.transactions.len(),
                    cache.path().display()
                );
                return Ok(RemoteSnapshot {
                    origin: RemoteOrigin::Cache,
                    fetched_at: entry.fetched_at,
                    transactions: entry.transactions.clone(),
                });
            }
        }

        let transactions = self.client.list_transactions(budget_id, account_id)?;
        if let Err(e) = cache.store(budget_id, account_id, transactions.clone(), now) {
            tracing::warn!("Could not update transaction cache: {}", e);
        }

        Ok(RemoteSnapshot {
            origin: RemoteOrigin::Api,
            fetched_at: now,
            transactions,
        })
    }

    /// Read and normalize the CSV export
    pub fn load_imported(&self, csv_path: &Path) -> ReconcileResult<NormalizedBatch> {
        let rows = CsvImporter::open(csv_path, self.config.column_mapping.delimiter)?;
        let batch = Normalizer::from_config(&self.config).normalize_rows(rows)?;
        tracing::info!(
            "Read {} transactions from {} ({} skipped)",
            batch.transactions.len(),
            csv_path.display(),
            batch.skipped.len()
        );
        Ok(batch)
    }

    /// Run a full reconciliation of one account against one CSV file
    pub fn run(
        &self,
        budget_id: &str,
        account_id: &str,
        csv_path: &Path,
    ) -> ReconcileResult<ReconcileReport> {
        let snapshot = self.load_remote(budget_id, account_id)?;
        let imported = self.load_imported(csv_path)?;

        let remote = Normalizer::from_config(&self.config).normalize_remote_all(&snapshot.transactions)?;
        tracing::info!(
            "Loaded {} remote transactions for account {}",
            remote.transactions.len(),
            account_id
        );

        let reconciliation = ReconciliationMatcher::new(self.config.match_config())
            .reconcile(&remote.transactions, &imported.transactions);
        let summary = reconciliation.summary();

        let mut skipped = remote.skipped;
        skipped.extend(imported.skipped);

        Ok(ReconcileReport {
            budget_id: budget_id.to_string(),
            account_id: account_id.to_string(),
            csv_path: csv_path.display().to_string(),
            remote_origin: snapshot.origin,
            remote_fetched_at: snapshot.fetched_at,
            date_window_days: self.config.date_window_days,
            decimal_places: self.config.decimal_places,
            summary,
            results: reconciliation.into_results(),
            skipped,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ReconcileError;
    use crate::models::{AccountSummary, BudgetSummary, MatchKind, Source};
    use std::cell::Cell;
    use tempfile::TempDir;

    /// In-memory ledger that counts transaction fetches
    pub(crate) struct FakeLedger {
        pub budgets: Vec<BudgetSummary>,
        pub accounts: Vec<AccountSummary>,
        pub transactions: Vec<RemoteTransaction>,
        pub fail_with_auth: bool,
        pub fetches: Cell<usize>,
    }

    impl FakeLedger {
        pub(crate) fn with_transactions(transactions: Vec<RemoteTransaction>) -> Self {
            Self {
                budgets: vec![BudgetSummary {
                    id: "b1".into(),
                    name: "Household".into(),
                }],
                accounts: vec![AccountSummary {
                    id: "a1".into(),
                    name: "Checking".into(),
                    closed: false,
                    deleted: false,
                }],
                transactions,
                fail_with_auth: false,
                fetches: Cell::new(0),
            }
        }
    }

    impl LedgerClient for FakeLedger {
        fn list_budgets(&self) -> ReconcileResult<Vec<BudgetSummary>> {
            Ok(self.budgets.clone())
        }

        fn list_accounts(&self, _budget_id: &str) -> ReconcileResult<Vec<AccountSummary>> {
            Ok(self.accounts.clone())
        }

        fn list_transactions(
            &self,
            _budget_id: &str,
            _account_id: &str,
        ) -> ReconcileResult<Vec<RemoteTransaction>> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail_with_auth {
                return Err(ReconcileError::Auth("bad token".into()));
            }
            Ok(self.transactions.clone())
        }
    }

    pub(crate) fn raw(id: &str, date: &str, milliunits: i64, payee: &str) -> RemoteTransaction {
        RemoteTransaction {
            id: id.to_string(),
            date: date.to_string(),
            amount: milliunits,
            payee_name: Some(payee.to_string()),
            memo: None,
            import_id: None,
            deleted: false,
        }
    }

    fn write_csv(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("bank.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_run_classifies_both_sides() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = FakeLedger::with_transactions(vec![
            raw("t1", "2024-01-01", -5000, "Coffee"),
            raw("t2", "2024-01-03", -20000, "Rent"),
            raw("t3", "2024-01-10", -1000, "Gym"),
        ]);
        let csv = write_csv(
            &temp_dir,
            "Date,Amount,Payee\n\
             2024-01-02,-5.00,COFFEE SHOP\n\
             2024-01-03,-210.00,RENT LLC\n\
             not a date,-1.00,Broken\n\
             2024-02-01,-3.50,Books\n",
        );

        let session = Session::new(ReconcileConfig::default(), &ledger)
            .with_cache_path(temp_dir.path().join("transactions"));
        let report = session.run("b1", "a1", &csv).unwrap();

        assert_eq!(report.remote_origin, RemoteOrigin::Api);
        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.summary.amount_mismatch, 1);
        assert_eq!(report.summary.remote_only, 1);
        assert_eq!(report.summary.import_only, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source, Source::Imported);
        assert_eq!(report.skipped[0].row, 4);
        assert_eq!(report.results[0].kind(), MatchKind::Matched);
    }

    #[test]
    fn test_second_run_uses_cache() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = FakeLedger::with_transactions(vec![raw("t1", "2024-01-01", -5000, "Coffee")]);
        let csv = write_csv(&temp_dir, "date,amount,payee\n2024-01-01,-5.00,Coffee\n");
        let cache_path = temp_dir.path().join("transactions");

        let session = Session::new(ReconcileConfig::default(), &ledger).with_cache_path(&cache_path);
        session.run("b1", "a1", &csv).unwrap();
        let report = session.run("b1", "a1", &csv).unwrap();

        assert_eq!(ledger.fetches.get(), 1);
        assert_eq!(report.remote_origin, RemoteOrigin::Cache);
        assert!(cache_path.exists());
    }

    #[test]
    fn test_refresh_bypasses_cache() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = FakeLedger::with_transactions(vec![raw("t1", "2024-01-01", -5000, "Coffee")]);
        let cache_path = temp_dir.path().join("transactions");

        let session = Session::new(ReconcileConfig::default(), &ledger).with_cache_path(&cache_path);
        session.load_remote("b1", "a1").unwrap();

        let refreshing = Session::new(ReconcileConfig::default(), &ledger)
            .with_cache_path(&cache_path)
            .with_refresh(true);
        let snapshot = refreshing.load_remote("b1", "a1").unwrap();

        assert_eq!(ledger.fetches.get(), 2);
        assert_eq!(snapshot.origin, RemoteOrigin::Api);
    }

    #[test]
    fn test_corrupt_cache_is_refetched() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("transactions");
        std::fs::write(&cache_path, "garbage").unwrap();
        let ledger = FakeLedger::with_transactions(vec![raw("t1", "2024-01-01", -5000, "Coffee")]);

        let session = Session::new(ReconcileConfig::default(), &ledger).with_cache_path(&cache_path);
        let snapshot = session.load_remote("b1", "a1").unwrap();

        assert_eq!(snapshot.transactions.len(), 1);
        assert!(TransactionCache::load(&cache_path).unwrap().get("b1", "a1").is_some());
    }

    #[test]
    fn test_auth_failure_aborts_before_reading_csv() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = FakeLedger::with_transactions(Vec::new());
        ledger.fail_with_auth = true;

        let session = Session::new(ReconcileConfig::default(), &ledger)
            .with_cache_path(temp_dir.path().join("transactions"));
        let err = session
            .run("b1", "a1", &temp_dir.path().join("missing.csv"))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Auth(_)));
    }

    #[test]
    fn test_missing_csv_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = FakeLedger::with_transactions(vec![raw("t1", "2024-01-01", -5000, "Coffee")]);

        let session = Session::new(ReconcileConfig::default(), &ledger)
            .with_cache_path(temp_dir.path().join("transactions"));
        let err = session
            .run("b1", "a1", &temp_dir.path().join("missing.csv"))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::FileNotFound(_)));
    }

    #[test]
    fn test_remote_with_sub_cent_amount_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = FakeLedger::with_transactions(vec![
            raw("t1", "2024-01-01", -5005, "Coffee"),
            raw("t2", "2024-01-01", -5000, "Coffee"),
        ]);
        let csv = write_csv(&temp_dir, "date,amount,payee\n2024-01-01,-5.00,Coffee\n");

        let session = Session::new(ReconcileConfig::default(), &ledger)
            .with_cache_path(temp_dir.path().join("transactions"));
        let report = session.run("b1", "a1", &csv).unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source, Source::Remote);
        assert_eq!(report.skipped[0].row, 1);
        assert_eq!(report.summary.matched, 1);
        assert!(report.summary.is_clean());
    }
}
