//! Service layer for ynab-reconciler
//!
//! Normalization, indexing and matching, plus the session that drives a
//! full reconciliation run.

pub mod index;
pub mod matcher;
pub mod normalize;
pub mod session;

pub use index::{CoarseKey, TransactionIndex};
pub use matcher::{MatchConfig, MatchSummary, Reconciliation, ReconciliationMatcher};
pub use normalize::{ColumnMapping, NormalizedBatch, Normalizer, SkippedRecord};
pub use session::{ReconcileReport, Session};
