//! Path management for ynab-reconciler
//!
//! ## Path Resolution Order
//!
//! 1. `YNAB_RECONCILER_DIR` environment variable (if set)
//! 2. The platform configuration directory (`~/.config/ynab-reconciler` on
//!    Linux, `~/Library/Application Support/ynab-reconciler` on macOS,
//!    `%APPDATA%\ynab-reconciler` on Windows)
//!
//! The transaction cache is not stored here: it lives at a fixed path
//! relative to the working directory (see [`crate::storage::cache`]).

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ReconcileError;

/// Environment variable that overrides the base directory
pub const DIR_ENV_VAR: &str = "YNAB_RECONCILER_DIR";

/// Manages the paths used by ynab-reconciler
#[derive(Debug, Clone)]
pub struct ReconcilerPaths {
    /// Base directory for configuration
    base_dir: PathBuf,
}

impl ReconcilerPaths {
    /// Create a new ReconcilerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, ReconcileError> {
        let base_dir = match std::env::var(DIR_ENV_VAR) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create ReconcilerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), ReconcileError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ReconcileError::Io(format!("Failed to create base directory: {}", e)))
    }
}

fn resolve_default_path() -> Result<PathBuf, ReconcileError> {
    ProjectDirs::from("", "", "ynab-reconciler")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ReconcileError::Config("Could not determine home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ReconcilerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        std::env::set_var(DIR_ENV_VAR, custom_path);
        let paths = ReconcilerPaths::new().unwrap();
        std::env::remove_var(DIR_ENV_VAR);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ReconcilerPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();
        assert!(paths.base_dir().exists());
    }
}
