//! Budget and account commands
//!
//! Listing commands plus the budget/account selection shared with the
//! reconcile command. A preset id (environment or flag) is used as-is;
//! otherwise a single candidate is picked silently and several produce a menu.

use clap::Args;

use crate::client::{LedgerClient, YnabClient};
use crate::config::{CredentialInputs, ReconcileConfig};
use crate::display::{format_account_list, format_budget_list};
use crate::error::ReconcileResult;
use crate::prompt::{choose, Prompter};

/// Arguments of `budgets`
#[derive(Debug, Clone, Default, Args)]
pub struct BudgetsArgs {
    /// YNAB personal access token
    #[arg(long)]
    pub token: Option<String>,
}

/// Arguments of `accounts`
#[derive(Debug, Clone, Default, Args)]
pub struct AccountsArgs {
    /// YNAB personal access token
    #[arg(long)]
    pub token: Option<String>,

    /// Budget ID (prompted when omitted)
    #[arg(long)]
    pub budget: Option<String>,

    /// Include closed and deleted accounts
    #[arg(long)]
    pub all: bool,
}

/// Pick the budget to reconcile
pub fn select_budget(
    client: &dyn LedgerClient,
    preset: Option<&str>,
    prompter: &mut dyn Prompter,
) -> ReconcileResult<String> {
    if let Some(id) = preset {
        tracing::info!("Using budget {}", id);
        return Ok(id.to_string());
    }

    let budgets = client.list_budgets()?;
    let budget = choose(prompter, "Budget", &budgets, |b| b.name.as_str())?;
    tracing::info!("Using budget {} ({})", budget.name, budget.id);
    Ok(budget.id.clone())
}

/// Pick the account to reconcile; closed and deleted accounts are not offered
pub fn select_account(
    client: &dyn LedgerClient,
    budget_id: &str,
    preset: Option<&str>,
    prompter: &mut dyn Prompter,
) -> ReconcileResult<String> {
    if let Some(id) = preset {
        tracing::info!("Using account {}", id);
        return Ok(id.to_string());
    }

    let accounts: Vec<_> = client
        .list_accounts(budget_id)?
        .into_iter()
        .filter(|a| a.is_open())
        .collect();
    let account = choose(prompter, "Account", &accounts, |a| a.name.as_str())?;
    tracing::info!("Using account {} ({})", account.name, account.id);
    Ok(account.id.clone())
}

/// Handle the `budgets` command
pub fn handle_budgets_command(
    config: &ReconcileConfig,
    args: BudgetsArgs,
    prompter: &mut dyn Prompter,
) -> ReconcileResult<()> {
    let inputs = CredentialInputs::from_process_env(CredentialInputs {
        token: args.token,
        ..CredentialInputs::default()
    });
    let client = YnabClient::with_base_url(inputs.token_or_prompt(prompter)?, &config.api_base_url)?;

    print!("{}", format_budget_list(&client.list_budgets()?));
    Ok(())
}

/// Handle the `accounts` command
pub fn handle_accounts_command(
    config: &ReconcileConfig,
    args: AccountsArgs,
    prompter: &mut dyn Prompter,
) -> ReconcileResult<()> {
    let inputs = CredentialInputs::from_process_env(CredentialInputs {
        token: args.token,
        budget_id: args.budget,
        ..CredentialInputs::default()
    });
    let client = YnabClient::with_base_url(inputs.token_or_prompt(prompter)?, &config.api_base_url)?;
    let budget_id = select_budget(&client, inputs.budget_id.as_deref(), prompter)?;

    print!(
        "{}",
        format_account_list(&client.list_accounts(&budget_id)?, args.all)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::error::ReconcileError;
    use crate::models::{AccountSummary, BudgetSummary};
    use crate::services::session::tests::FakeLedger;

    fn budget(id: &str, name: &str) -> BudgetSummary {
        BudgetSummary {
            id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_preset_budget_skips_api() {
        let mut ledger = FakeLedger::with_transactions(Vec::new());
        ledger.budgets.clear();
        let mut prompter = ScriptedPrompter::new(&[]);

        let id = select_budget(&ledger, Some("b-preset"), &mut prompter).unwrap();
        assert_eq!(id, "b-preset");
    }

    #[test]
    fn test_budget_menu() {
        let mut ledger = FakeLedger::with_transactions(Vec::new());
        ledger.budgets = vec![budget("b1", "Household"), budget("b2", "Business")];
        let mut prompter = ScriptedPrompter::new(&["#2"]);

        let id = select_budget(&ledger, None, &mut prompter).unwrap();
        assert_eq!(id, "b2");
        assert_eq!(
            prompter.transcript,
            vec!["Choose a budget:", "#1: Household", "#2: Business", "Budget: "]
        );
    }

    #[test]
    fn test_closed_accounts_not_offered() {
        let mut ledger = FakeLedger::with_transactions(Vec::new());
        ledger.accounts.insert(
            0,
            AccountSummary {
                id: "a0".into(),
                name: "Old card".into(),
                closed: true,
                deleted: false,
            },
        );
        let mut prompter = ScriptedPrompter::new(&[]);

        // Only one open account remains, so no menu
        let id = select_account(&ledger, "b1", None, &mut prompter).unwrap();
        assert_eq!(id, "a1");
        assert!(prompter.transcript.is_empty());
    }

    #[test]
    fn test_no_budgets_is_config_error() {
        let mut ledger = FakeLedger::with_transactions(Vec::new());
        ledger.budgets.clear();
        let mut prompter = ScriptedPrompter::new(&[]);

        let err = select_budget(&ledger, None, &mut prompter).unwrap_err();
        assert!(matches!(err, ReconcileError::Config(_)));
    }
}
