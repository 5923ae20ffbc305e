//! Reconciliation matcher
//!
//! Pairs remote and imported transactions in three passes of decreasing
//! strictness, then classifies whatever is left:
//!
//! 1. **Exact key**: an imported reference equal to a remote id or import
//!    id, or appearing as a word of the remote memo.
//! 2. **Amount + date window**: identical amount, dates at most
//!    `date_window_days` apart, searched within the coarse-key candidates.
//! 3. **Amount mismatch**: same coarse key and date window, different amount.
//! 4. **Residual**: unpaired remotes are `RemoteOnly`, unpaired imports
//!    `ImportOnly`.
//!
//! Imported transactions are visited in input order in every pass. Among
//! eligible remotes the smallest date distance wins and ties go to the
//! earliest remote in input order, so duplicates on the import side are
//! paired first-come first-served and the outcome is deterministic.
//! Inputs are borrowed and never modified.

use serde::{Deserialize, Serialize};

use super::index::{CoarseKey, TransactionIndex};
use crate::models::{MatchKind, MatchResult, MatchTier, Money, Transaction};

/// Matcher options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Maximum distance in days between the two sides of a pair (inclusive)
    pub date_window_days: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { date_window_days: 3 }
    }
}

/// Classified output of a matcher run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    results: Vec<MatchResult>,
}

impl Reconciliation {
    /// All results: pairs in the order they were made, then `RemoteOnly`,
    /// then `ImportOnly`, each in input order
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<MatchResult> {
        self.results
    }

    /// Results of one kind, in result order
    pub fn of_kind(&self, kind: MatchKind) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(move |r| r.kind() == kind)
    }

    pub fn count(&self, kind: MatchKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Counts and totals per kind
    pub fn summary(&self) -> MatchSummary {
        let mut summary = MatchSummary::default();
        for result in &self.results {
            match result.kind() {
                MatchKind::Matched => summary.matched += 1,
                MatchKind::AmountMismatch => {
                    summary.amount_mismatch += 1;
                    summary.mismatch_delta += result.amount_delta().unwrap_or_default();
                }
                MatchKind::RemoteOnly => {
                    summary.remote_only += 1;
                    summary.remote_only_total +=
                        result.remote().map(|t| t.amount).unwrap_or_default();
                }
                MatchKind::ImportOnly => {
                    summary.import_only += 1;
                    summary.import_only_total +=
                        result.imported().map(|t| t.amount).unwrap_or_default();
                }
            }
        }
        summary
    }
}

/// Per-kind counts and the money left unexplained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub matched: usize,
    pub amount_mismatch: usize,
    pub remote_only: usize,
    pub import_only: usize,
    /// Sum of (imported - remote) over mismatched pairs
    pub mismatch_delta: Money,
    pub remote_only_total: Money,
    pub import_only_total: Money,
}

impl MatchSummary {
    /// Whether both sides agree completely
    pub fn is_clean(&self) -> bool {
        self.amount_mismatch == 0 && self.remote_only == 0 && self.import_only == 0
    }
}

/// Tiered transaction matcher
#[derive(Debug, Clone, Default)]
pub struct ReconciliationMatcher {
    config: MatchConfig,
}

/// Which transactions are still unpaired
struct Remaining {
    remote: Vec<bool>,
    imported: Vec<bool>,
}

impl Remaining {
    fn new(remote: usize, imported: usize) -> Self {
        Self {
            remote: vec![true; remote],
            imported: vec![true; imported],
        }
    }

    fn take(&mut self, remote: usize, imported: usize) {
        self.remote[remote] = false;
        self.imported[imported] = false;
    }
}

impl ReconciliationMatcher {
    /// Create a matcher
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Classify every transaction of both sides
    pub fn reconcile(&self, remote: &[Transaction], imported: &[Transaction]) -> Reconciliation {
        let mut remaining = Remaining::new(remote.len(), imported.len());
        let mut results = Vec::with_capacity(remote.len().max(imported.len()));

        if !remote.is_empty() && !imported.is_empty() {
            let index = TransactionIndex::build(remote);

            self.exact_key_pass(remote, imported, &mut remaining, &mut results);
            self.amount_date_pass(&index, remote, imported, &mut remaining, &mut results);
            self.amount_mismatch_pass(&index, remote, imported, &mut remaining, &mut results);
        }

        let paired = results.len();
        results.extend(
            remote
                .iter()
                .zip(&remaining.remote)
                .filter(|(_, left)| **left)
                .map(|(txn, _)| MatchResult::remote_only(txn.clone())),
        );
        results.extend(
            imported
                .iter()
                .zip(&remaining.imported)
                .filter(|(_, left)| **left)
                .map(|(txn, _)| MatchResult::import_only(txn.clone())),
        );

        tracing::info!(
            "Matched {} pairs; {} remote and {} imported transactions left over",
            paired,
            remaining.remote.iter().filter(|left| **left).count(),
            remaining.imported.iter().filter(|left| **left).count(),
        );

        Reconciliation { results }
    }

    fn exact_key_pass(
        &self,
        remote: &[Transaction],
        imported: &[Transaction],
        remaining: &mut Remaining,
        results: &mut Vec<MatchResult>,
    ) {
        for (i, imp) in imported.iter().enumerate() {
            if !remaining.imported[i] {
                continue;
            }
            let Some(reference) = imp.reference.as_deref().map(str::trim).filter(|r| !r.is_empty())
            else {
                continue;
            };

            let hit = remote
                .iter()
                .enumerate()
                .find(|(r, cand)| remaining.remote[*r] && echoes_reference(cand, reference));

            if let Some((r, cand)) = hit {
                tracing::debug!("Tier 1: reference {} pairs CSV row {}", reference, imp.position);
                remaining.take(r, i);
                results.push(MatchResult::paired(MatchTier::ExactKey, cand.clone(), imp.clone()));
            }
        }
    }

    fn amount_date_pass(
        &self,
        index: &TransactionIndex,
        remote: &[Transaction],
        imported: &[Transaction],
        remaining: &mut Remaining,
        results: &mut Vec<MatchResult>,
    ) {
        for (i, imp) in imported.iter().enumerate() {
            if !remaining.imported[i] {
                continue;
            }
            let best = self.closest_candidate(index, remote, &remaining.remote, imp, |cand| {
                cand.amount == imp.amount
            });
            if let Some(r) = best {
                remaining.take(r, i);
                results.push(MatchResult::paired(MatchTier::AmountDate, remote[r].clone(), imp.clone()));
            }
        }
    }

    fn amount_mismatch_pass(
        &self,
        index: &TransactionIndex,
        remote: &[Transaction],
        imported: &[Transaction],
        remaining: &mut Remaining,
        results: &mut Vec<MatchResult>,
    ) {
        for (i, imp) in imported.iter().enumerate() {
            if !remaining.imported[i] {
                continue;
            }
            let key = CoarseKey::of(&imp.payee);
            let best = self.closest_candidate(index, remote, &remaining.remote, imp, |cand| {
                cand.amount != imp.amount && CoarseKey::of(&cand.payee) == key
            });
            if let Some(r) = best {
                tracing::debug!(
                    "Tier 3: amount mismatch {} vs {} on {}",
                    remote[r].amount,
                    imp.amount,
                    imp.date
                );
                remaining.take(r, i);
                results.push(MatchResult::paired(
                    MatchTier::AmountMismatch,
                    remote[r].clone(),
                    imp.clone(),
                ));
            }
        }
    }

    /// Remaining candidate closest in date that passes `accept`; ties go to
    /// the earliest position
    fn closest_candidate(
        &self,
        index: &TransactionIndex,
        remote: &[Transaction],
        remote_left: &[bool],
        imp: &Transaction,
        accept: impl Fn(&Transaction) -> bool,
    ) -> Option<usize> {
        let window = u64::from(self.config.date_window_days);
        let mut best: Option<(usize, u64)> = None;

        // Candidates come in ascending position order
        for r in index.candidates_for(imp) {
            if !remote_left[r] {
                continue;
            }
            let cand = &remote[r];
            let delta = cand.days_apart(imp);
            if delta > window || !accept(cand) {
                continue;
            }
            if best.map_or(true, |(_, best_delta)| delta < best_delta) {
                best = Some((r, delta));
            }
        }

        best.map(|(r, _)| r)
    }
}

/// Whether a remote transaction carries the given reference
fn echoes_reference(remote: &Transaction, reference: &str) -> bool {
    if remote.id.as_deref() == Some(reference) || remote.reference.as_deref() == Some(reference) {
        return true;
    }
    remote.memo.as_deref().is_some_and(|memo| {
        memo.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')' | '[' | ']'))
            .any(|word| word.trim_matches(|c: char| c == '.' || c == ':' || c == '#') == reference)
    })
}
