use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ynab_reconciler::cli::{
    handle_accounts_command, handle_budgets_command, handle_reconcile_command, AccountsArgs,
    BudgetsArgs, ReconcileArgs, TerminalPrompter,
};
use ynab_reconciler::config::{paths::ReconcilerPaths, settings::ReconcileConfig};
use ynab_reconciler::storage::DEFAULT_CACHE_FILE;

#[derive(Parser)]
#[command(
    name = "ynab-reconciler",
    version,
    about = "Reconcile YNAB account transactions against a bank CSV export",
    long_about = "Fetches the transactions of one YNAB account, reads a CSV export \
                  from your bank, and reports which transactions match, which differ \
                  in amount, and which exist on only one side.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    reconcile: ReconcileArgs,

    /// Settings file (defaults to config.json in the config directory)
    #[arg(long, global = true, env = "YNAB_RECONCILER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile an account against a CSV export (default)
    Reconcile(ReconcileArgs),

    /// List budgets visible to the token
    Budgets(BudgetsArgs),

    /// List the accounts of a budget
    Accounts(AccountsArgs),

    /// Show current configuration and paths
    Config {
        /// Write the effective settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ynab_reconciler=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ynab_reconciler=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Only the working directory's .env; variables already set win
    dotenvy::from_path(".env").ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = ReconcilerPaths::new()?;
    let settings_file = cli.config.clone().unwrap_or_else(|| paths.settings_file());
    let settings = ReconcileConfig::load_from(&settings_file)?;

    let mut prompter = TerminalPrompter;

    match cli.command {
        None => handle_reconcile_command(settings, cli.reconcile, &mut prompter)?,
        Some(Commands::Reconcile(args)) => handle_reconcile_command(settings, args, &mut prompter)?,
        Some(Commands::Budgets(args)) => handle_budgets_command(&settings, args, &mut prompter)?,
        Some(Commands::Accounts(args)) => handle_accounts_command(&settings, args, &mut prompter)?,
        Some(Commands::Config { init }) => {
            if init {
                match &cli.config {
                    Some(path) => settings.save_to(path)?,
                    None => settings.save(&paths)?,
                }
                println!("Wrote settings to {}", settings_file.display());
                println!();
            }

            println!("ynab-reconciler Configuration");
            println!("=============================");
            println!("Settings file:  {}", settings_file.display());
            println!("Cache file:     {} (override with --cache)", DEFAULT_CACHE_FILE);
            println!();
            println!("Settings:");
            println!("  Date window:     {} days", settings.date_window_days);
            println!("  Decimal places:  {}", settings.decimal_places);
            println!("  CSV delimiter:   '{}'", settings.column_mapping.delimiter);
            match settings.cache_ttl_hours {
                Some(hours) => println!("  Cache TTL:       {} hours", hours),
                None => println!("  Cache TTL:       none (cached transactions never expire)"),
            }
            println!("  API base URL:    {}", settings.api_base_url);
        }
    }

    Ok(())
}
