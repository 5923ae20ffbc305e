//! Credential and input resolution
//!
//! Token, budget id, account id and CSV path come from the environment, then
//! command-line flags, then an interactive prompt, in that order. The result
//! is an explicit value passed to the components that need it.

use std::fmt;
use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::prompt::Prompter;
use crate::error::{ReconcileError, ReconcileResult};

pub const TOKEN_ENV: &str = "YNAB_TOKEN";
pub const BUDGET_ENV: &str = "YNAB_BUDGET";
pub const ACCOUNT_ENV: &str = "YNAB_ACCOUNT";
pub const CSV_ENV: &str = "YNAB_CSV";

/// Values known before any prompting happens
#[derive(Clone, Default)]
pub struct CredentialInputs {
    pub token: Option<String>,
    pub budget_id: Option<String>,
    pub account_id: Option<String>,
    pub csv_path: Option<PathBuf>,
}

impl fmt::Debug for CredentialInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialInputs")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("budget_id", &self.budget_id)
            .field("account_id", &self.account_id)
            .field("csv_path", &self.csv_path)
            .finish()
    }
}

impl CredentialInputs {
    /// Merge environment values over flag values
    pub fn resolve(flags: CredentialInputs, env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            token: first_usable(env(TOKEN_ENV), flags.token),
            budget_id: first_usable(env(BUDGET_ENV), flags.budget_id),
            account_id: first_usable(env(ACCOUNT_ENV), flags.account_id),
            csv_path: first_usable(
                env(CSV_ENV),
                flags.csv_path.map(|p| p.to_string_lossy().into_owned()),
            )
            .map(PathBuf::from),
        }
    }

    /// Merge the process environment over flag values
    pub fn from_process_env(flags: CredentialInputs) -> Self {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    /// The API token, prompting (hidden input) when none was supplied
    pub fn token_or_prompt(&self, prompter: &mut dyn Prompter) -> ReconcileResult<Zeroizing<String>> {
        if let Some(token) = &self.token {
            return Ok(Zeroizing::new(token.clone()));
        }

        let entered = Zeroizing::new(prompter.ask_secret("YNAB token: ")?);
        let trimmed = entered.trim();
        if trimmed.is_empty() {
            return Err(ReconcileError::MissingToken);
        }
        Ok(Zeroizing::new(trimmed.to_string()))
    }

    /// The CSV path, prompting when none was supplied
    pub fn csv_path_or_prompt(&self, prompter: &mut dyn Prompter) -> ReconcileResult<PathBuf> {
        if let Some(path) = &self.csv_path {
            return Ok(path.clone());
        }

        let entered = prompter.ask("CSV file: ")?;
        let trimmed = entered.trim();
        if trimmed.is_empty() {
            return Err(ReconcileError::MissingCsvPath);
        }
        Ok(PathBuf::from(trimmed))
    }
}

/// Fully resolved inputs for one reconciliation run
pub struct Credentials {
    pub token: Zeroizing<String>,
    pub budget_id: String,
    pub account_id: String,
    pub csv_path: PathBuf,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("budget_id", &self.budget_id)
            .field("account_id", &self.account_id)
            .field("csv_path", &self.csv_path)
            .finish()
    }
}

fn first_usable(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .into_iter()
        .chain(fallback)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
