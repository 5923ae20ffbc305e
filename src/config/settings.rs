//! Reconciliation settings
//!
//! The options a run recognizes, persisted as `config.json` in the base
//! directory. Every field has a default so a missing or partial file works.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::paths::ReconcilerPaths;
use crate::error::ReconcileError;
use crate::models::money::MAX_DECIMAL_PLACES;
use crate::services::matcher::MatchConfig;
use crate::services::normalize::ColumnMapping;

/// Default YNAB API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.youneedabudget.com/v1";

/// Settings for a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Maximum distance in days between two sides of a match
    #[serde(default = "default_date_window_days")]
    pub date_window_days: u32,

    /// Fractional digits of the account currency
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,

    /// How CSV columns map onto transaction fields
    #[serde(default)]
    pub column_mapping: ColumnMapping,

    /// Age after which a cached transaction list is refetched.
    /// `None` keeps cached entries forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_hours: Option<u64>,

    /// Base URL of the YNAB API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_date_window_days() -> u32 {
    3
}

fn default_decimal_places() -> u32 {
    2
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            date_window_days: default_date_window_days(),
            decimal_places: default_decimal_places(),
            column_mapping: ColumnMapping::default(),
            cache_ttl_hours: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl ReconcileConfig {
    /// Load settings from the base directory, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &ReconcilerPaths) -> Result<Self, ReconcileError> {
        Self::load_from(paths.settings_file())
    }

    /// Load settings from an explicit file, or defaults if it doesn't exist
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ReconcileError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ReconcileError::Io(format!("Failed to read settings file: {}", e)))?;

        let config: ReconcileConfig = serde_json::from_str(&contents)
            .map_err(|e| ReconcileError::Config(format!("Failed to parse settings file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save settings to the base directory
    pub fn save(&self, paths: &ReconcilerPaths) -> Result<(), ReconcileError> {
        paths.ensure_directories()?;
        self.save_to(paths.settings_file())
    }

    /// Save settings to an explicit file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ReconcileError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ReconcileError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| ReconcileError::Io(format!("Failed to write settings file: {}", e)))
    }

    /// Reject values the rest of the pipeline cannot honor
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ReconcileError::Config(format!(
                "decimal_places must be at most {}, got {}",
                MAX_DECIMAL_PLACES, self.decimal_places
            )));
        }
        let separator = self.column_mapping.decimal_separator;
        if separator != '.' && separator != ',' {
            return Err(ReconcileError::Config(format!(
                "decimal_separator must be '.' or ',', got '{}'",
                separator
            )));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ReconcileError::Config("api_base_url cannot be empty".into()));
        }
        Ok(())
    }

    /// Matcher options derived from these settings
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            date_window_days: self.date_window_days,
        }
    }
}
