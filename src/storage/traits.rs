//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::url::StorageKey;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for page storage backends
///
/// A store maps a [`StorageKey`] to a location and writes captured markup
/// there. Writing the same key twice replaces the earlier content.
pub trait PageStore: Send {
    /// Writes `markup` under `key`, creating any missing parents
    ///
    /// # Returns
    ///
    /// The location the markup was written to
    fn write(&mut self, key: &StorageKey, markup: &[u8]) -> StorageResult<PathBuf>;

    /// Returns the location `key` maps to without writing anything
    fn location(&self, key: &StorageKey) -> PathBuf;
}
