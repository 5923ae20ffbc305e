//! Budget and account listings
//!
//! Used by the `budgets` and `accounts` subcommands to show the ids a run can
//! be pointed at.

use crate::models::{AccountSummary, BudgetSummary};

/// Format budgets as an id/name table
pub fn format_budget_list(budgets: &[BudgetSummary]) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n".to_string();
    }

    let id_width = budgets.iter().map(|b| b.id.len()).max().unwrap_or(2).max(2);

    let mut output = String::new();
    output.push_str(&format!("{:<id_width$}  {}\n", "ID", "Name", id_width = id_width));
    output.push_str(&format!("{:-<id_width$}  {:-<20}\n", "", "", id_width = id_width));

    for budget in budgets {
        output.push_str(&format!(
            "{:<id_width$}  {}\n",
            budget.id,
            budget.name,
            id_width = id_width
        ));
    }

    output
}

/// Format accounts as an id/name/status table
///
/// Closed and deleted accounts are only listed when `include_closed` is set.
pub fn format_account_list(accounts: &[AccountSummary], include_closed: bool) -> String {
    let shown: Vec<&AccountSummary> = accounts
        .iter()
        .filter(|a| include_closed || a.is_open())
        .collect();

    if shown.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let id_width = shown.iter().map(|a| a.id.len()).max().unwrap_or(2).max(2);
    let name_width = shown.iter().map(|a| a.name.len()).max().unwrap_or(4).max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id_width$}  {:<name_width$}  {}\n",
        "ID",
        "Name",
        "Status",
        id_width = id_width,
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<id_width$}  {:-<name_width$}  {:-<8}\n",
        "",
        "",
        "",
        id_width = id_width,
        name_width = name_width,
    ));

    for account in shown {
        let status = if account.deleted {
            "Deleted"
        } else if account.closed {
            "Closed"
        } else {
            "Open"
        };
        output.push_str(&format!(
            "{:<id_width$}  {:<name_width$}  {}\n",
            account.id,
            account.name,
            status,
            id_width = id_width,
            name_width = name_width,
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, name: &str, closed: bool) -> AccountSummary {
        AccountSummary {
            id: id.into(),
            name: name.into(),
            closed,
            deleted: false,
        }
    }

    #[test]
    fn test_budget_list() {
        let budgets = vec![BudgetSummary {
            id: "b-123".into(),
            name: "Household".into(),
        }];
        let output = format_budget_list(&budgets);
        assert!(output.contains("b-123  Household"));
        assert_eq!(format_budget_list(&[]), "No budgets found.\n");
    }

    #[test]
    fn test_account_list_hides_closed() {
        let accounts = vec![account("a1", "Checking", false), account("a2", "Old card", true)];

        let open_only = format_account_list(&accounts, false);
        assert!(open_only.contains("Checking"));
        assert!(!open_only.contains("Old card"));

        let all = format_account_list(&accounts, true);
        assert!(all.contains("Old card"));
        assert!(all.contains("Closed"));
    }

    #[test]
    fn test_account_list_empty() {
        let accounts = vec![account("a2", "Old card", true)];
        assert_eq!(format_account_list(&accounts, false), "No accounts found.\n");
    }
}
