//! Reconcile command
//!
//! Resolves the run inputs (environment, flags, prompts), picks the budget
//! and account, runs a session and prints the report.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use zeroize::Zeroizing;

use super::budget::{select_account, select_budget};
use crate::client::{LedgerClient, YnabClient};
use crate::config::{CredentialInputs, Credentials, ReconcileConfig};
use crate::display::{format_json, format_report, ReportOptions};
use crate::error::{ReconcileError, ReconcileResult};
use crate::prompt::Prompter;
use crate::services::{ReconcileReport, Session};
use crate::storage::DEFAULT_CACHE_FILE;

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Arguments of a reconciliation run
#[derive(Debug, Clone, Default, Args)]
pub struct ReconcileArgs {
    /// Bank CSV export to reconcile
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// YNAB personal access token
    #[arg(long)]
    pub token: Option<String>,

    /// Budget ID
    #[arg(long)]
    pub budget: Option<String>,

    /// Account ID
    #[arg(long)]
    pub account: Option<String>,

    /// Maximum days between matching transactions
    #[arg(long, value_name = "DAYS")]
    pub window: Option<u32>,

    /// Fractional digits of the account currency
    #[arg(long, value_name = "N")]
    pub decimal_places: Option<u32>,

    /// Transaction cache file
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Refetch transactions even if a cached copy exists
    #[arg(long)]
    pub refresh: bool,

    /// List matched transactions too
    #[arg(long)]
    pub show_matched: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl ReconcileArgs {
    /// Settings with this run's flags applied on top
    pub fn apply_to(&self, mut config: ReconcileConfig) -> ReconcileResult<ReconcileConfig> {
        if let Some(window) = self.window {
            config.date_window_days = window;
        }
        if let Some(places) = self.decimal_places {
            config.decimal_places = places;
        }
        config.validate()?;
        Ok(config)
    }

    fn flag_inputs(&self) -> CredentialInputs {
        CredentialInputs {
            token: self.token.clone(),
            budget_id: self.budget.clone(),
            account_id: self.account.clone(),
            csv_path: self.csv.clone(),
        }
    }
}

/// Handle the reconcile command against the live API
pub fn handle_reconcile_command(
    config: ReconcileConfig,
    args: ReconcileArgs,
    prompter: &mut dyn Prompter,
) -> ReconcileResult<()> {
    let inputs = CredentialInputs::from_process_env(args.flag_inputs());
    let api_base_url = config.api_base_url.clone();

    let report = run_reconcile(config, &args, inputs, prompter, |token| {
        YnabClient::with_base_url(token, &api_base_url)
    })?;

    match args.format {
        OutputFormat::Table => print!(
            "{}",
            format_report(
                &report,
                ReportOptions {
                    show_matched: args.show_matched,
                }
            )
        ),
        OutputFormat::Json => println!("{}", format_json(&report)?),
    }

    Ok(())
}

/// Resolve inputs and run one reconciliation.
///
/// The CSV path is settled before any network call so a bad path fails fast.
pub fn run_reconcile<C, F>(
    config: ReconcileConfig,
    args: &ReconcileArgs,
    inputs: CredentialInputs,
    prompter: &mut dyn Prompter,
    connect: F,
) -> ReconcileResult<ReconcileReport>
where
    C: LedgerClient,
    F: FnOnce(Zeroizing<String>) -> ReconcileResult<C>,
{
    let config = args.apply_to(config)?;

    let token = inputs.token_or_prompt(prompter)?;
    let csv_path = inputs.csv_path_or_prompt(prompter)?;
    if !csv_path.is_file() {
        return Err(ReconcileError::FileNotFound(csv_path.display().to_string()));
    }

    let client = connect(token.clone())?;
    let budget_id = select_budget(&client, inputs.budget_id.as_deref(), prompter)?;
    let account_id = select_account(&client, &budget_id, inputs.account_id.as_deref(), prompter)?;

    let credentials = Credentials {
        token,
        budget_id,
        account_id,
        csv_path,
    };
    tracing::debug!("Resolved run inputs: {:?}", credentials);

    let cache_path = args
        .cache
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));

    Session::new(config, &client)
        .with_cache_path(cache_path)
        .with_refresh(args.refresh)
        .run(
            &credentials.budget_id,
            &credentials.account_id,
            &credentials.csv_path,
        )
}
