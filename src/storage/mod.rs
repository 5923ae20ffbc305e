//! Storage layer for ynab-reconciler
//!
//! The only persisted data is the transaction cache, written as JSON with
//! atomic replace.

pub mod cache;
pub mod file_io;

pub use cache::{CacheEntry, TransactionCache, DEFAULT_CACHE_FILE};
pub use file_io::{read_json, write_json_atomic};
