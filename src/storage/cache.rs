//! Transaction cache
//!
//! Keeps the last fetched transaction list per budget/account pair in a
//! single JSON document (`transactions` in the working directory unless
//! overridden), so repeated runs against the same export skip the network.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::models::RemoteTransaction;

use super::file_io::{read_json, write_json_atomic};

/// Default cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "transactions";

/// One cached transaction list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub budget_id: String,
    pub account_id: String,
    pub fetched_at: DateTime<Utc>,
    pub transactions: Vec<RemoteTransaction>,
}

impl CacheEntry {
    /// Whether the entry is older than `ttl_hours` at `now`.
    /// Without a TTL nothing is ever stale.
    pub fn is_stale(&self, ttl_hours: Option<u64>, now: DateTime<Utc>) -> bool {
        match ttl_hours {
            None => false,
            Some(hours) => {
                let age_secs = i128::from(now.signed_duration_since(self.fetched_at).num_seconds());
                age_secs > i128::from(hours) * 3600
            }
        }
    }

    fn is_for(&self, budget_id: &str, account_id: &str) -> bool {
        self.budget_id == budget_id && self.account_id == account_id
    }
}

/// Serialized layout of the cache file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheData {
    #[serde(default)]
    entries: Vec<CacheEntry>,
}

/// File-backed transaction cache
#[derive(Debug)]
pub struct TransactionCache {
    path: PathBuf,
    data: CacheData,
}

impl TransactionCache {
    /// Open a cache file; a missing file is an empty cache
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ReconcileError> {
        let path = path.into();
        let data: CacheData = read_json(&path).map_err(|e| {
            ReconcileError::Cache(format!("Failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded {} cache entries from {}", data.entries.len(), path.display());
        Ok(Self { path, data })
    }

    /// An empty cache that will be written to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: CacheData::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// Entry for a budget/account pair regardless of age
    pub fn get(&self, budget_id: &str, account_id: &str) -> Option<&CacheEntry> {
        self.data
            .entries
            .iter()
            .find(|e| e.is_for(budget_id, account_id))
    }

    /// Entry for a budget/account pair if it is still usable at `now`
    pub fn get_fresh(
        &self,
        budget_id: &str,
        account_id: &str,
        ttl_hours: Option<u64>,
        now: DateTime<Utc>,
    ) -> Option<&CacheEntry> {
        let entry = self.get(budget_id, account_id)?;

        if entry.is_stale(ttl_hours, now) {
            tracing::debug!(
                "Cache entry for account {} fetched at {} is stale",
                account_id,
                entry.fetched_at
            );
            return None;
        }

        if ttl_hours.is_none() {
            tracing::warn!(
                "Using cached transactions from {} with no cache_ttl_hours set; pass --refresh to refetch",
                entry.fetched_at
            );
        }
        Some(entry)
    }

    /// Insert or replace the entry for a budget/account pair and write the file
    pub fn store(
        &mut self,
        budget_id: &str,
        account_id: &str,
        transactions: Vec<RemoteTransaction>,
        now: DateTime<Utc>,
    ) -> Result<(), ReconcileError> {
        let entry = CacheEntry {
            budget_id: budget_id.to_string(),
            account_id: account_id.to_string(),
            fetched_at: now,
            transactions,
        };

        match self
            .data
            .entries
            .iter_mut()
            .find(|e| e.is_for(budget_id, account_id))
        {
            Some(existing) => *existing = entry,
            None => self.data.entries.push(entry),
        }

        self.save()
    }

    /// Write the cache file
    pub fn save(&self) -> Result<(), ReconcileError> {
        write_json_atomic(&self.path, &self.data).map_err(|e| {
            ReconcileError::Cache(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}
