//! Transaction model
//!
//! The normalized shape both sides of a reconciliation are converted into,
//! plus the classified results the matcher produces.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Where a normalized transaction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Fetched from the budgeting API (or its cache)
    Remote,
    /// Read from the bank CSV export
    Imported,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "Remote"),
            Self::Imported => write!(f, "Imported"),
        }
    }
}

/// A normalized transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Remote identifier, absent for CSV rows
    pub id: Option<String>,

    /// External reference (remote import id, or a CSV reference column)
    pub reference: Option<String>,

    /// Transaction date
    pub date: NaiveDate,

    /// Amount (positive for inflow, negative for outflow)
    pub amount: Money,

    /// Payee label, possibly empty
    #[serde(default)]
    pub payee: String,

    /// Memo/notes
    pub memo: Option<String>,

    /// Which side this transaction belongs to
    pub source: Source,

    /// Position within its source (CSV data row or remote list order)
    pub position: usize,

    /// Line of the CSV file the row was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Transaction {
    /// Create a remote transaction
    pub fn remote(id: impl Into<String>, date: NaiveDate, amount: Money, payee: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            reference: None,
            date,
            amount,
            payee: payee.into(),
            memo: None,
            source: Source::Remote,
            position: 0,
            line: None,
        }
    }

    /// Create an imported transaction
    pub fn imported(date: NaiveDate, amount: Money, payee: impl Into<String>) -> Self {
        Self {
            id: None,
            reference: None,
            date,
            amount,
            payee: payee.into(),
            memo: None,
            source: Source::Imported,
            position: 0,
            line: None,
        }
    }

    /// Set the memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Set the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Set the input position
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Set the CSV line
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Absolute number of days between two transactions
    pub fn days_apart(&self, other: &Transaction) -> u64 {
        (self.date - other.date).num_days().unsigned_abs()
    }
}

/// Classification of a reconciliation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Same real-world transaction on both sides
    Matched,
    /// Paired by date and payee, but the amounts differ
    AmountMismatch,
    /// Only present in the budget
    RemoteOnly,
    /// Only present in the CSV export
    ImportOnly,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => write!(f, "Matched"),
            Self::AmountMismatch => write!(f, "Amount mismatch"),
            Self::RemoteOnly => write!(f, "Only in YNAB"),
            Self::ImportOnly => write!(f, "Only in CSV"),
        }
    }
}

/// Matching pass that produced a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Reference echoed between both sides
    ExactKey,
    /// Equal amount within the date window
    AmountDate,
    /// Same payee and date window, different amount
    AmountMismatch,
}

/// One classified outcome of the matcher
///
/// Fields are private so that at least one side is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    kind: MatchKind,
    tier: Option<MatchTier>,
    remote: Option<Transaction>,
    imported: Option<Transaction>,
}

impl MatchResult {
    /// A pair found by one of the matching tiers.
    ///
    /// The kind follows the amounts: only equal amounts are `Matched`.
    pub fn paired(tier: MatchTier, remote: Transaction, imported: Transaction) -> Self {
        let kind = if remote.amount == imported.amount {
            MatchKind::Matched
        } else {
            MatchKind::AmountMismatch
        };
        Self {
            kind,
            tier: Some(tier),
            remote: Some(remote),
            imported: Some(imported),
        }
    }

    /// A remote transaction with no counterpart
    pub fn remote_only(remote: Transaction) -> Self {
        Self {
            kind: MatchKind::RemoteOnly,
            tier: None,
            remote: Some(remote),
            imported: None,
        }
    }

    /// An imported transaction with no counterpart
    pub fn import_only(imported: Transaction) -> Self {
        Self {
            kind: MatchKind::ImportOnly,
            tier: None,
            remote: None,
            imported: Some(imported),
        }
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn tier(&self) -> Option<MatchTier> {
        self.tier
    }

    pub fn remote(&self) -> Option<&Transaction> {
        self.remote.as_ref()
    }

    pub fn imported(&self) -> Option<&Transaction> {
        self.imported.as_ref()
    }

    /// Amount difference (imported minus remote) for paired results
    pub fn amount_delta(&self) -> Option<Money> {
        match (&self.remote, &self.imported) {
            (Some(r), Some(i)) => Some(i.amount - r.amount),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_builders() {
        let txn = Transaction::imported(date("2024-01-02"), Money::from_minor(-500), "COFFEE")
            .with_memo("latte")
            .with_reference("REF1")
            .at_position(3);

        assert_eq!(txn.source, Source::Imported);
        assert!(txn.id.is_none());
        assert_eq!(txn.memo.as_deref(), Some("latte"));
        assert_eq!(txn.reference.as_deref(), Some("REF1"));
        assert_eq!(txn.position, 3);
    }

    #[test]
    fn test_days_apart_is_symmetric() {
        let a = Transaction::remote("r1", date("2024-01-01"), Money::zero(), "");
        let b = Transaction::imported(date("2024-01-04"), Money::zero(), "");
        assert_eq!(a.days_apart(&b), 3);
        assert_eq!(b.days_apart(&a), 3);
    }

    #[test]
    fn test_paired_kinds() {
        let r = Transaction::remote("r1", date("2024-01-01"), Money::from_minor(-500), "A");
        let i = Transaction::imported(date("2024-01-01"), Money::from_minor(-700), "A");

        let same = Transaction::imported(date("2024-01-02"), Money::from_minor(-500), "A");
        let matched = MatchResult::paired(MatchTier::AmountDate, r.clone(), same);
        assert_eq!(matched.kind(), MatchKind::Matched);
        assert_eq!(matched.amount_delta(), Some(Money::zero()));

        // A reference echo with differing amounts is still a mismatch
        let echoed = MatchResult::paired(MatchTier::ExactKey, r.clone(), i.clone());
        assert_eq!(echoed.kind(), MatchKind::AmountMismatch);
        assert_eq!(echoed.tier(), Some(MatchTier::ExactKey));

        let mismatch = MatchResult::paired(MatchTier::AmountMismatch, r, i);
        assert_eq!(mismatch.kind(), MatchKind::AmountMismatch);
        assert_eq!(mismatch.amount_delta(), Some(Money::from_minor(-200)));
    }

    #[test]
    fn test_single_sided_results() {
        let r = Transaction::remote("r1", date("2024-01-01"), Money::from_minor(-500), "A");
        let only = MatchResult::remote_only(r);
        assert_eq!(only.kind(), MatchKind::RemoteOnly);
        assert!(only.remote().is_some());
        assert!(only.imported().is_none());
        assert!(only.amount_delta().is_none());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&MatchKind::AmountMismatch).unwrap();
        assert_eq!(json, "\"amount_mismatch\"");
    }
}
