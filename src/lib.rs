//! ynab-reconciler - Reconcile YNAB transactions against a bank CSV export
//!
//! This library fetches the transactions of one YNAB account, reads a CSV
//! export of the same account, and classifies every transaction on both
//! sides as matched, mismatched in amount, or present on one side only.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings, paths and credential resolution
//! - `error`: Custom error types
//! - `models`: Money, normalized transactions and API records
//! - `client`: YNAB API access
//! - `import`: CSV reading
//! - `services`: Normalization, indexing, matching and the run session
//! - `storage`: Transaction cache
//! - `display`: Report rendering
//! - `prompt`: Operator prompts and numbered menus
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ynab_reconciler::client::YnabClient;
//! use ynab_reconciler::config::ReconcileConfig;
//! use ynab_reconciler::services::Session;
//!
//! let client = YnabClient::new(token)?;
//! let session = Session::new(ReconcileConfig::default(), &client);
//! let report = session.run(&budget_id, &account_id, "bank.csv".as_ref())?;
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod import;
pub mod models;
pub mod prompt;
pub mod services;
pub mod storage;

pub use error::{ReconcileError, ReconcileResult};
