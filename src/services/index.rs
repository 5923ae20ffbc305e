//! Coarse-key index over transactions
//!
//! Buckets transactions by the first character of their payee so the matcher
//! only compares transactions that plausibly share a payee. Payees drift
//! between sources ("Coffee" vs "COFFEE SHOP #12"), so the key is deliberately
//! lossy, and transactions without a payee land in a sentinel bucket that is
//! always searched.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::Transaction;

/// Lossy grouping key derived from a payee label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoarseKey {
    /// First character of the trimmed payee, lowercased
    Char(char),
    /// Payee is empty
    Sentinel,
}

impl CoarseKey {
    /// Key for a payee label
    pub fn of(payee: &str) -> Self {
        payee
            .trim()
            .chars()
            .next()
            .map(|c| Self::Char(c.to_lowercase().next().unwrap_or(c)))
            .unwrap_or(Self::Sentinel)
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel)
    }
}

impl fmt::Display for CoarseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c),
            Self::Sentinel => write!(f, "(empty)"),
        }
    }
}

/// Index from coarse key to positions in the indexed slice
#[derive(Debug, Clone, Default)]
pub struct TransactionIndex {
    buckets: BTreeMap<CoarseKey, Vec<usize>>,
    len: usize,
}

impl TransactionIndex {
    /// Index a slice; bucket entries are slice positions in ascending order
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut buckets: BTreeMap<CoarseKey, Vec<usize>> = BTreeMap::new();
        for (idx, txn) in transactions.iter().enumerate() {
            buckets.entry(CoarseKey::of(&txn.payee)).or_default().push(idx);
        }
        Self {
            buckets,
            len: transactions.len(),
        }
    }

    /// Number of indexed transactions
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Positions sharing a key
    pub fn bucket(&self, key: CoarseKey) -> &[usize] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidate positions for a transaction from the other source.
    ///
    /// Returns the bucket for the transaction's own key merged with the
    /// sentinel bucket, in ascending position order. A transaction without a
    /// payee cannot narrow the search and gets every position.
    pub fn candidates_for(&self, txn: &Transaction) -> Vec<usize> {
        let key = CoarseKey::of(&txn.payee);
        if key.is_sentinel() {
            return (0..self.len).collect();
        }

        let own = self.bucket(key);
        let sentinel = self.bucket(CoarseKey::Sentinel);
        let mut merged = Vec::with_capacity(own.len() + sentinel.len());
        let (mut i, mut j) = (0, 0);
        while i < own.len() && j < sentinel.len() {
            if own[i] < sentinel[j] {
                merged.push(own[i]);
                i += 1;
            } else {
                merged.push(sentinel[j]);
                j += 1;
            }
        }
        merged.extend_from_slice(&own[i..]);
        merged.extend_from_slice(&sentinel[j..]);
        merged
    }
}
