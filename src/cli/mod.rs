//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod reconcile;

pub use budget::{handle_accounts_command, handle_budgets_command, AccountsArgs, BudgetsArgs};
pub use crate::prompt::{Prompter, TerminalPrompter};
pub use reconcile::{handle_reconcile_command, OutputFormat, ReconcileArgs};
