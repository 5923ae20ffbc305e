//! Display formatting for terminal output
//!
//! Formatters return strings; printing is left to the CLI handlers.

pub mod account;
pub mod report;

pub use account::{format_account_list, format_budget_list};
pub use report::{format_json, format_report, format_summary, ReportOptions};
