//! Error types for wuprobe-inventory

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while reading the update inventory
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// The shell could not be started
    #[error("failed to spawn {program}: {message}")]
    SpawnError {
        /// Program that was launched
        program: String,
        /// OS error message
        message: String,
    },

    /// The query script exited non-zero
    #[error("query failed: {status} - {message}")]
    QueryFailed {
        /// Exit status
        status: i32,
        /// stderr output
        message: String,
    },

    /// The query did not finish in time
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// Output could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// I/O error while waiting for the query
    #[error("I/O error: {0}")]
    IoError(String),

    /// Snapshot cache could not be read or written
    #[error("cache error: {0}")]
    CacheError(String),
}

impl InventoryError {
    /// Check if a later run is likely to succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InventoryError::Timeout(_) | InventoryError::QueryFailed { .. }
        )
    }
}
