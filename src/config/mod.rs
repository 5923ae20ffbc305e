//! Configuration module for ynab-reconciler
//!
//! This module provides:
//! - Base directory resolution
//! - Persisted reconciliation settings
//! - Credential and input resolution (environment, flags, prompt)

pub mod credentials;
pub mod paths;
pub mod settings;

pub use credentials::{CredentialInputs, Credentials};
pub use paths::ReconcilerPaths;
pub use settings::ReconcileConfig;
