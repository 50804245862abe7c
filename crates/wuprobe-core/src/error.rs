//! Error types for a probe run

use thiserror::Error;
use wuprobe_client::ClientError;
use wuprobe_inventory::InventoryError;

/// Errors that can end or degrade a probe run
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Update inventory could not be read
    #[error("inventory unavailable: {0}")]
    Inventory(#[from] InventoryError),

    /// Login to the monitoring server failed; nothing was submitted
    #[error("authentication failed: {0}")]
    Auth(#[source] ClientError),

    /// Result could not be delivered; the local status still stands
    #[error("submission failed: {0}")]
    Submit(#[source] ClientError),
}

impl ProbeError {
    /// Check if the error was a network timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            ProbeError::Auth(e) | ProbeError::Submit(e) => e.is_timeout(),
            ProbeError::Inventory(e) => matches!(e, InventoryError::Timeout(_)),
        }
    }
}
