//! Inventory source trait

use async_trait::async_trait;
use wuprobe_api::UpdateRecord;

use crate::error::InventoryError;

/// Where the probe gets its view of pending updates from
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// All updates not yet installed, hidden ones included
    async fn pending_updates(&self) -> Result<Vec<UpdateRecord>, InventoryError>;

    /// Whether an installed update is waiting for a restart
    async fn reboot_pending(&self) -> Result<bool, InventoryError>;

    /// Short name for logging
    fn source_type(&self) -> &'static str;
}
