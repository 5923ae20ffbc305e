//! Core data models for ynab-reconciler
//!
//! This module contains the data structures shared by every stage of a run:
//! amounts, normalized transactions, match results and the raw records the
//! YNAB API returns.

pub mod money;
pub mod remote;
pub mod transaction;

pub use money::{Money, MoneyParseError};
pub use remote::{AccountSummary, BudgetSummary, RemoteTransaction};
pub use transaction::{MatchKind, MatchResult, MatchTier, Source, Transaction};
